/// The session controller: title screen, waves, pauses, wins, losses.
///
/// A `GameSession` owns the current wave and everything that outlives a
/// single wave (wave counter, alien speed, volume).  Once per frame the
/// host calls `tick`, which advances the state machine, steps the wave while
/// play is active and returns a `RenderModel` describing the frame.

use crate::audio::{Mixer, SoundCue};
use crate::config::GameConfig;
use crate::entities::{Outcome, SessionState};
use crate::input::{Debounce, InputSource, Key};
use crate::render::{self, Backdrop, Element, Label, RenderModel, Surface, TextStyle, Transition};
use crate::wave::WaveSimulator;

/// A host-agnostic game: any loop that can measure time, sample keys and
/// draw onto a `Surface` can run it.
pub trait Controller {
    /// Put the controller into its start-of-process state.
    fn initialize(&mut self);
    fn tick(&mut self, dt: f64, input: &dyn InputSource) -> RenderModel;
    fn render<S: Surface>(&self, model: &RenderModel, surface: &mut S) -> Result<(), S::Error> {
        render::render(model, surface)
    }
}

// ── Messages ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    pub primary: &'static str,
    pub secondary: Option<&'static str>,
}

pub const WELCOME: Message = Message {
    primary: "Press Enter to Start",
    secondary: Some("Alien Invaders"),
};

pub const PAUSED: Message = Message {
    primary: "Press Space to Continue",
    secondary: None,
};

pub const WON: Message = Message {
    primary: "**YOU WIN**",
    secondary: Some("Hit Enter for Next Wave"),
};

pub const LOST: Message = Message {
    primary: "GAME OVER",
    secondary: Some("Hit Enter to Restart"),
};

/// The message a state shows.  The pass-through states keep whatever was
/// already on screen.
pub fn select_message(state: SessionState, current: Option<Message>) -> Option<Message> {
    match state {
        SessionState::Inactive => Some(WELCOME),
        SessionState::Active => None,
        SessionState::Paused => Some(PAUSED),
        SessionState::Won => Some(WON),
        SessionState::Lost => Some(LOST),
        SessionState::NewWave | SessionState::Continue => current,
    }
}

pub const INSTRUCTIONS: [&str; 5] = [
    "Controls:",
    "SPACE to shoot",
    "UP arrow key to fire missile",
    "LEFT AND RIGHT arrow keys to move",
    "M to mute music",
];

fn instruction_labels() -> Vec<Label> {
    INSTRUCTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let style = if i == 0 { TextStyle::Banner } else { TextStyle::Body };
            Label::centered(*text, 1 + i as i16, style)
        })
        .collect()
}

pub fn wave_counter(wave_count: u32) -> Label {
    Label {
        text: format!("Wave {wave_count}"),
        anchor: render::Anchor::TopLeft { x: 1, y: 0 },
        style: TextStyle::Hud,
        color: render::TEXT_COLOR,
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

pub struct GameSession<W: WaveSimulator> {
    state: SessionState,
    wave: Option<W>,
    message: Option<Message>,
    /// Shared by Enter (start / next wave / restart) and Space (continue).
    advance: Debounce,
    mute: Debounce,
    speed_modifier: f64,
    wave_count: u32,
    mixer: Mixer,
    instructions: Vec<Label>,
    backdrop: Backdrop,
    cues: Vec<SoundCue>,
    transitions: Vec<Transition>,
    config: GameConfig,
    spawn_wave: Box<dyn FnMut() -> W>,
}

impl<W: WaveSimulator> GameSession<W> {
    /// `spawn_wave` builds a fresh wave every time the session starts one.
    pub fn new(config: GameConfig, spawn_wave: impl FnMut() -> W + 'static) -> Self {
        let backdrop = Backdrop::Starfield {
            seed: config.seed.unwrap_or_else(rand::random),
        };
        let mut session = GameSession {
            state: SessionState::Inactive,
            wave: None,
            message: None,
            advance: Debounce::default(),
            mute: Debounce::default(),
            speed_modifier: config.baseline_speed,
            wave_count: 1,
            mixer: Mixer::new(config.effect_volume, config.music_volume),
            instructions: Vec::new(),
            backdrop,
            cues: Vec::new(),
            transitions: Vec::new(),
            config,
            spawn_wave: Box::new(spawn_wave),
        };
        session.initialize();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn wave(&self) -> Option<&W> {
        self.wave.as_ref()
    }

    pub fn message(&self) -> Option<Message> {
        self.message
    }

    pub fn speed_modifier(&self) -> f64 {
        self.speed_modifier
    }

    pub fn wave_count(&self) -> u32 {
        self.wave_count
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        tracing::debug!(?from, ?to, "session transition");
        self.state = to;
        self.transitions.push(Transition { from, to });
    }

    fn refresh_message(&mut self) {
        self.message = select_message(self.state, self.message);
    }

    fn check_invariants(&self) {
        debug_assert_eq!(
            self.wave.is_none(),
            self.state == SessionState::Inactive,
            "wave must exist exactly when the session is not inactive (state {:?})",
            self.state
        );
        debug_assert_eq!(
            self.message.is_none(),
            self.state == SessionState::Active,
            "message must exist exactly when the session is not active (state {:?})",
            self.state
        );
    }

    /// Advance the session by one frame.
    pub fn update(&mut self, dt: f64, input: &dyn InputSource) {
        self.refresh_message();

        if self.state == SessionState::Inactive {
            if self.advance.pressed(input, Key::Enter) {
                self.transition(SessionState::NewWave);
            }
            self.instructions = instruction_labels();
        }

        if self.state == SessionState::NewWave {
            self.wave = Some((self.spawn_wave)());
            tracing::info!(
                wave = self.wave_count,
                speed_modifier = self.speed_modifier,
                "wave spawned"
            );
            self.transition(SessionState::Active);
        }

        if self.state == SessionState::Active {
            self.play_frame(dt, input);
        }

        if self.state == SessionState::Paused && self.advance.pressed(input, Key::Space) {
            self.transition(SessionState::Continue);
        }

        if self.state == SessionState::Continue {
            if let Some(wave) = self.wave.as_mut() {
                wave.resume_after_life_loss();
            }
            self.transition(SessionState::Active);
        }

        if matches!(self.state, SessionState::Won | SessionState::Lost) {
            if self.state == SessionState::Lost {
                self.speed_modifier = self.config.baseline_speed;
            }
            if self.advance.pressed(input, Key::Enter) {
                if self.state == SessionState::Won {
                    self.speed_modifier *= self.config.speed_ratio;
                }
                self.transition(SessionState::NewWave);
            }
        }

        if self.mute.pressed(input, Key::Mute) {
            self.mixer.toggle();
            tracing::info!(muted = self.mixer.is_muted(), "sound toggled");
        }

        // A debounce skipped this frame still has to see its key count.
        self.advance.observe(input);
        self.refresh_message();
        self.check_invariants();
    }

    /// Step the wave and react to what it reports.  Win beats a lost life.
    fn play_frame(&mut self, dt: f64, input: &dyn InputSource) {
        let Some(wave) = self.wave.as_mut() else {
            return;
        };
        let lives_before = wave.lives();
        wave.frame_update(input, dt, self.speed_modifier, self.mixer.effect_volume());
        self.cues.extend(wave.drain_cues());
        let lives = wave.lives();

        if wave.outcome() == Outcome::Won {
            self.wave_count += 1;
            tracing::info!(next_wave = self.wave_count, "wave cleared");
            self.transition(SessionState::Won);
        } else if lives != lives_before && lives > 0 {
            self.transition(SessionState::Paused);
        } else if lives == 0 {
            wave.set_outcome(Outcome::Lost);
            tracing::info!(reached_wave = self.wave_count, "game over");
            self.wave_count = 1;
            self.transition(SessionState::Lost);
        }
        self.refresh_message();
    }

    /// Project the current state into drawable elements.
    pub fn frame(&self) -> RenderModel {
        let mut elements = Vec::new();
        let message = self.message.into_iter();

        match self.state {
            SessionState::Inactive => {
                elements.extend(self.instructions.iter().cloned().map(Element::Label));
                for m in message {
                    if let Some(title) = m.secondary {
                        elements.push(Element::Label(Label::centered(title, -6, TextStyle::Title)));
                    }
                    elements.push(Element::Label(Label::centered(m.primary, -3, TextStyle::Banner)));
                }
            }
            SessionState::Won | SessionState::Lost => {
                for m in message {
                    elements.push(Element::Label(Label::centered(m.primary, -1, TextStyle::Title)));
                    if let Some(sub) = m.secondary {
                        elements.push(Element::Label(Label::centered(sub, 1, TextStyle::Body)));
                    }
                }
            }
            SessionState::Active | SessionState::NewWave | SessionState::Continue => {
                if let Some(wave) = &self.wave {
                    elements.push(Element::Wave(wave.view()));
                }
                elements.push(Element::Label(wave_counter(self.wave_count)));
            }
            SessionState::Paused => {
                if let Some(wave) = &self.wave {
                    elements.push(Element::Wave(wave.view()));
                }
                elements.push(Element::Label(wave_counter(self.wave_count)));
                for m in message {
                    elements.push(Element::Label(Label::centered(m.primary, 0, TextStyle::Banner)));
                }
            }
        }

        RenderModel {
            backdrop: self.backdrop,
            elements,
            cues: Vec::new(),
            music_volume: self.mixer.music_volume(),
            transitions: Vec::new(),
        }
    }
}

impl<W: WaveSimulator> Controller for GameSession<W> {
    fn initialize(&mut self) {
        self.state = SessionState::Inactive;
        self.wave = None;
        self.message = Some(WELCOME);
        self.advance = Debounce::default();
        self.mute = Debounce::default();
        self.speed_modifier = self.config.baseline_speed;
        self.wave_count = 1;
        self.mixer = Mixer::new(self.config.effect_volume, self.config.music_volume);
        if self.config.start_muted {
            self.mixer.mute();
        }
        self.instructions = instruction_labels();
        self.cues.clear();
        self.transitions.clear();
        tracing::debug!(song = self.mixer.song().name, "session initialized");
    }

    fn tick(&mut self, dt: f64, input: &dyn InputSource) -> RenderModel {
        self.update(dt, input);
        let mut model = self.frame();
        model.cues = std::mem::take(&mut self.cues);
        model.transitions = std::mem::take(&mut self.transitions);
        model
    }
}
