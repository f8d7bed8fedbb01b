/// Frame output.
///
/// A `RenderModel` is everything one tick produced: what to draw, in order,
/// and what to play.  Drawing it is `render`, which walks the model onto any
/// `Surface`; the terminal surface lives in the binary, tests use their own.

use crossterm::style::Color;

use crate::audio::{AudioSurface, SoundCue};
use crate::entities::SessionState;
use crate::wave::WaveView;

pub const TEXT_COLOR: Color = Color::Green;

/// Stands in for the font size of a proportional display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Banner,
    Body,
    Hud,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Horizontally centred, `dy` rows from the vertical centre.
    Center { dy: i16 },
    TopLeft { x: u16, y: u16 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: Anchor,
    pub style: TextStyle,
    pub color: Color,
}

impl Label {
    pub fn centered(text: impl Into<String>, dy: i16, style: TextStyle) -> Self {
        Label {
            text: text.into(),
            anchor: Anchor::Center { dy },
            style,
            color: TEXT_COLOR,
        }
    }
}

/// Drawn beneath everything, every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    Starfield { seed: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Label(Label),
    Wave(WaveView),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    pub backdrop: Backdrop,
    /// Drawn in order, after the backdrop.
    pub elements: Vec<Element>,
    pub cues: Vec<SoundCue>,
    pub music_volume: f32,
    /// Every state change the tick went through, pass-throughs included.
    pub transitions: Vec<Transition>,
}

impl RenderModel {
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.elements.iter().filter_map(|e| match e {
            Element::Label(label) => Some(label),
            Element::Wave(_) => None,
        })
    }

    pub fn wave(&self) -> Option<&WaveView> {
        self.elements.iter().find_map(|e| match e {
            Element::Wave(view) => Some(view),
            Element::Label(_) => None,
        })
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.labels().any(|l| l.text == text)
    }
}

pub trait Surface {
    type Error;

    fn draw_backdrop(&mut self, backdrop: &Backdrop) -> Result<(), Self::Error>;
    fn draw_label(&mut self, label: &Label) -> Result<(), Self::Error>;
    fn draw_wave(&mut self, wave: &WaveView) -> Result<(), Self::Error>;
    /// Make the frame visible.
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// Draw one complete frame.
pub fn render<S: Surface>(model: &RenderModel, surface: &mut S) -> Result<(), S::Error> {
    surface.draw_backdrop(&model.backdrop)?;
    for element in &model.elements {
        match element {
            Element::Label(label) => surface.draw_label(label)?,
            Element::Wave(view) => surface.draw_wave(view)?,
        }
    }
    surface.present()
}

/// Hand the frame's sound to an audio surface.
pub fn play<A: AudioSurface>(model: &RenderModel, audio: &mut A) {
    audio.set_music_volume(model.music_volume);
    for cue in &model.cues {
        audio.play(*cue);
    }
}
