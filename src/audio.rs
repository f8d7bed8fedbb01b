/// Sound: the volume mixer owned by the session, the cues a wave emits, and
/// the surface that actually plays them.

use std::io::Write;

use crossterm::{style::Print, QueueableCommand};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    ShipFire,
    MissileLaunch,
    AlienFire,
    AlienDeath,
    ShipDeath,
}

/// A request to play one effect at a given volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundCue {
    pub effect: Effect,
    pub volume: f32,
}

/// The looping background track.  Only its volume is mutable.
#[derive(Clone, Debug, PartialEq)]
pub struct MusicTrack {
    pub name: &'static str,
    pub looping: bool,
    pub volume: f32,
}

/// Effect and music volume plus the baselines the mute toggle restores.
#[derive(Clone, Debug, PartialEq)]
pub struct Mixer {
    effect_volume: f32,
    baseline_effect: f32,
    baseline_music: f32,
    muted: bool,
    song: MusicTrack,
}

impl Mixer {
    pub fn new(effect_volume: f32, music_volume: f32) -> Self {
        Mixer {
            effect_volume,
            baseline_effect: effect_volume,
            baseline_music: music_volume,
            muted: false,
            song: MusicTrack {
                name: "superboy",
                looping: true,
                volume: music_volume,
            },
        }
    }

    pub fn effect_volume(&self) -> f32 {
        self.effect_volume
    }

    pub fn music_volume(&self) -> f32 {
        self.song.volume
    }

    pub fn song(&self) -> &MusicTrack {
        &self.song
    }

    /// Set by `mute`, cleared by `unmute`.  Independent of the volumes, so
    /// a silent music baseline can still mute the effects.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn mute(&mut self) {
        self.effect_volume = 0.0;
        self.song.volume = 0.0;
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.effect_volume = self.baseline_effect;
        self.song.volume = self.baseline_music;
        self.muted = false;
    }

    pub fn toggle(&mut self) {
        if self.is_muted() {
            self.unmute();
        } else {
            self.mute();
        }
    }
}

pub trait AudioSurface {
    fn set_music_volume(&mut self, volume: f32);
    fn play(&mut self, cue: SoundCue);
}

/// A terminal has exactly one sound: the bell.  Audible cues ring it once
/// per frame at most; the music volume is tracked but unheard.
pub struct TerminalBell<W: Write> {
    out: W,
    music_volume: f32,
    rang_this_frame: bool,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        TerminalBell {
            out,
            music_volume: 0.0,
            rang_this_frame: false,
        }
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    /// Flush any pending bell and re-arm for the next frame.
    pub fn end_frame(&mut self) -> std::io::Result<()> {
        self.rang_this_frame = false;
        self.out.flush()
    }
}

impl<W: Write> AudioSurface for TerminalBell<W> {
    fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume;
    }

    fn play(&mut self, cue: SoundCue) {
        if cue.volume <= 0.0 || self.rang_this_frame {
            return;
        }
        // Only the hits are worth a bell; firing happens too often.
        if matches!(cue.effect, Effect::AlienDeath | Effect::ShipDeath) {
            if let Err(e) = self.out.queue(Print('\u{7}')) {
                tracing::warn!("bell failed: {e}");
            }
            self.rang_this_frame = true;
        }
    }
}
