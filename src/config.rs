use std::time::Duration;

use crate::error::GameError;

/// Alien step interval (seconds) at the start of a session.
pub const BASELINE_SPEED: f64 = 0.6;
/// Applied to the step interval every time a won wave rolls into the next.
pub const SPEED_RATIO: f64 = 0.85;
pub const EFFECT_VOLUME: f32 = 0.3;
pub const MUSIC_VOLUME: f32 = 0.2;

pub const DEFAULT_FPS: u32 = 30;
pub const MIN_FPS: u32 = 10;
pub const MAX_FPS: u32 = 120;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub fps: u32,
    pub baseline_speed: f64,
    pub speed_ratio: f64,
    pub effect_volume: f32,
    pub music_volume: f32,
    pub start_muted: bool,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            fps: DEFAULT_FPS,
            baseline_speed: BASELINE_SPEED,
            speed_ratio: SPEED_RATIO,
            effect_volume: EFFECT_VOLUME,
            music_volume: MUSIC_VOLUME,
            start_muted: false,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(GameError::InvalidConfig(format!(
                "fps must be within {MIN_FPS}..={MAX_FPS}, got {}",
                self.fps
            )));
        }
        if !(self.baseline_speed > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "baseline speed must be positive, got {}",
                self.baseline_speed
            )));
        }
        if !(self.speed_ratio > 0.0 && self.speed_ratio <= 1.0) {
            return Err(GameError::InvalidConfig(format!(
                "speed ratio must be within (0, 1], got {}",
                self.speed_ratio
            )));
        }
        if self.effect_volume < 0.0 || self.music_volume < 0.0 {
            return Err(GameError::InvalidConfig("volumes cannot be negative".into()));
        }
        Ok(())
    }

    /// Wall-clock budget for one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}
