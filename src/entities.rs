/// All game entity types: pure data, no logic.

// ── Session ──────────────────────────────────────────────────────────────────

/// Where the session is in its lifecycle.  `NewWave` and `Continue` are
/// pass-through states that perform one side effect on the way to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Inactive,
    NewWave,
    Active,
    Paused,
    Continue,
    Won,
    Lost,
}

/// How a wave has ended, if it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Undecided,
    Won,
    Lost,
}

// ── Aliens ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlienKind {
    /// Top row.
    Squid,
    /// Middle two rows.
    Crab,
    /// Bottom two rows.
    Octopus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    /// Centre column of the 3-wide sprite.
    pub x: i32,
    pub y: i32,
    pub kind: AlienKind,
    /// Seconds of death animation left; `None` while alive.
    pub dying: Option<f64>,
}

/// Direction the formation is currently marching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum March {
    Left,
    Right,
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoltOwner {
    Ship,
    Alien,
}

/// A single-cell shot.  `y` is fractional so speeds stay frame-rate
/// independent.
#[derive(Clone, Debug, PartialEq)]
pub struct Bolt {
    pub x: i32,
    pub y: f32,
    pub owner: BoltOwner,
}

/// A faster player projectile that passes through every alien it hits and
/// is removed only at the top of the field.
#[derive(Clone, Debug, PartialEq)]
pub struct Missile {
    pub x: i32,
    pub y: f32,
}

// ── Ship ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    /// Fractional centre column; drawn rounded.
    pub x: f32,
    /// Row of the sprite tip.
    pub y: i32,
}

/// Terminal dimensions the wave was laid out for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Field {
    pub width: u16,
    pub height: u16,
}

/// What the player asked the ship to do this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub missile: bool,
}

// ── Wave state ───────────────────────────────────────────────────────────────

/// Everything one wave owns.  Cloneable so the pure step functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveState {
    /// `None` while the ship is destroyed and the wave waits to resume.
    pub ship: Option<Ship>,
    pub aliens: Vec<Alien>,
    pub bolts: Vec<Bolt>,
    pub missiles: Vec<Missile>,
    pub missiles_left: u32,
    pub lives: u32,
    pub score: u32,
    pub outcome: Outcome,
    pub march: March,
    /// Seconds accumulated toward the next formation step.
    pub step_timer: f64,
    /// Formation steps remaining before an alien fires.
    pub steps_until_fire: u32,
    /// Alternates on every formation step to animate the sprites.
    pub anim_frame: bool,
    pub total_aliens: usize,
    pub field: Field,
}
