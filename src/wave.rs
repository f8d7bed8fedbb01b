/// A single wave: the collaborator the session hands each frame to while
/// play is active.

use rand::rngs::StdRng;
use rand::Rng;

use crate::audio::SoundCue;
use crate::compute;
use crate::entities::{Alien, Bolt, Controls, Field, Missile, Outcome, Ship, WaveState};
use crate::input::{InputSource, Key};

/// What the session needs from a wave.  Anything that can be stepped,
/// queried for lives and outcome, resumed and drawn will do.
pub trait WaveSimulator {
    fn frame_update(&mut self, input: &dyn InputSource, dt: f64, speed_modifier: f64, volume: f32);
    fn lives(&self) -> u32;
    fn outcome(&self) -> Outcome;
    fn set_outcome(&mut self, outcome: Outcome);
    /// Bring the ship back after a life was lost.
    fn resume_after_life_loss(&mut self);
    /// Everything needed to draw the wave.
    fn view(&self) -> WaveView;
    /// Sound cues emitted since the last call.
    fn drain_cues(&mut self) -> Vec<SoundCue>;
}

/// Render data a wave exposes.  Plain values only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveView {
    pub ship: Option<Ship>,
    pub aliens: Vec<Alien>,
    pub bolts: Vec<Bolt>,
    pub missiles: Vec<Missile>,
    pub anim_frame: bool,
    pub lives: u32,
    pub missiles_left: u32,
    pub score: u32,
    pub field: Field,
}

impl From<&WaveState> for WaveView {
    fn from(state: &WaveState) -> Self {
        WaveView {
            ship: state.ship.clone(),
            aliens: state.aliens.clone(),
            bolts: state.bolts.clone(),
            missiles: state.missiles.clone(),
            anim_frame: state.anim_frame,
            lives: state.lives,
            missiles_left: state.missiles_left,
            score: state.score,
            field: state.field,
        }
    }
}

/// The alien-formation wave, driven by the pure functions in `compute`.
pub struct Wave<R: Rng = StdRng> {
    state: WaveState,
    rng: R,
    cues: Vec<SoundCue>,
}

impl<R: Rng> Wave<R> {
    pub fn new(field: Field, mut rng: R) -> Self {
        let state = compute::init_wave(field, &mut rng);
        Wave {
            state,
            rng,
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> &WaveState {
        &self.state
    }
}

fn controls(input: &dyn InputSource) -> Controls {
    Controls {
        left: input.is_key_down(Key::Left),
        right: input.is_key_down(Key::Right),
        fire: input.is_key_down(Key::Space),
        missile: input.is_key_down(Key::Up),
    }
}

impl<R: Rng> WaveSimulator for Wave<R> {
    fn frame_update(&mut self, input: &dyn InputSource, dt: f64, speed_modifier: f64, volume: f32) {
        let (next, effects) =
            compute::step(&self.state, controls(input), dt, speed_modifier, &mut self.rng);
        if next.lives < self.state.lives {
            tracing::info!(lives = next.lives, score = next.score, "ship destroyed");
        }
        self.state = next;
        if volume > 0.0 {
            self.cues
                .extend(effects.into_iter().map(|effect| SoundCue { effect, volume }));
        }
    }

    fn lives(&self) -> u32 {
        self.state.lives
    }

    fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    fn set_outcome(&mut self, outcome: Outcome) {
        self.state.outcome = outcome;
    }

    fn resume_after_life_loss(&mut self) {
        self.state = compute::resume(&self.state);
    }

    fn view(&self) -> WaveView {
        WaveView::from(&self.state)
    }

    fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}
