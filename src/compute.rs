/// Pure wave-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `WaveState` (and, where needed, an RNG handle) and returns a brand-new
/// `WaveState`.  Side effects are limited to the injected RNG and the list
/// of sound effects a step reports back.

use rand::Rng;

use crate::audio::Effect;
use crate::entities::{
    Alien, AlienKind, Bolt, BoltOwner, Controls, Field, March, Missile, Outcome, Ship, WaveState,
};

// ── Tuning ───────────────────────────────────────────────────────────────────

pub const ALIEN_ROWS: usize = 5;
pub const ALIENS_IN_ROW: usize = 8;
/// Columns between alien centres.
pub const ALIEN_H_SEP: i32 = 5;
/// Rows between alien rows.
pub const ALIEN_V_SEP: i32 = 2;
/// Row of the top alien row when a wave spawns.
pub const ALIEN_TOP: i32 = 3;

pub const SHIP_LIVES: u32 = 3;
pub const SHIP_MISSILES: u32 = 3;

/// Speeds in cells per second.
pub const SHIP_SPEED: f32 = 24.0;
pub const SHIP_BOLT_SPEED: f32 = 20.0;
pub const ALIEN_BOLT_SPEED: f32 = 10.0;
pub const MISSILE_SPEED: f32 = 35.0;

/// Aliens fire after a random 1..=BOLT_RATE formation steps.
pub const BOLT_RATE: u32 = 4;
pub const DEATH_ANIMATION: f64 = 0.3;
/// The formation never steps faster than this fraction of the base interval.
pub const MIN_SPEED_FRACTION: f64 = 0.2;
/// Formation steps a single frame may catch up on.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

pub const MIN_WIDTH: u16 = 50;
pub const MIN_HEIGHT: u16 = 24;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// First playable row (row 0 is the HUD, row 1 the top border).
pub fn play_top(_field: &Field) -> i32 {
    2
}

/// Last playable row (the bottom border sits just below).
pub fn play_bottom(field: &Field) -> i32 {
    field.height as i32 - 3
}

/// Row of the ship's tip; its wings take the row below.
pub fn ship_row(field: &Field) -> i32 {
    field.height as i32 - 4
}

/// An alien reaching this row ends the game.
pub fn defense_line(field: &Field) -> i32 {
    field.height as i32 - 6
}

fn min_alien_x(_field: &Field) -> i32 {
    2
}

fn max_alien_x(field: &Field) -> i32 {
    field.width as i32 - 3
}

/// Score awarded per alien destroyed.
pub fn alien_points(kind: AlienKind) -> u32 {
    match kind {
        AlienKind::Squid => 30,
        AlienKind::Crab => 20,
        AlienKind::Octopus => 10,
    }
}

fn kind_for_row(row: usize) -> AlienKind {
    match row {
        0 => AlienKind::Squid,
        1 | 2 => AlienKind::Crab,
        _ => AlienKind::Octopus,
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn spawn_ship(field: &Field) -> Ship {
    Ship {
        x: (field.width / 2) as f32,
        y: ship_row(field),
    }
}

/// Build a fresh wave: full formation, full lives, full missile rack.
pub fn init_wave(field: Field, rng: &mut impl Rng) -> WaveState {
    let span = (ALIENS_IN_ROW as i32 - 1) * ALIEN_H_SEP;
    let first_x = (field.width as i32 - span) / 2;

    let aliens: Vec<Alien> = (0..ALIEN_ROWS)
        .flat_map(|row| {
            (0..ALIENS_IN_ROW).map(move |col| Alien {
                x: first_x + col as i32 * ALIEN_H_SEP,
                y: ALIEN_TOP + row as i32 * ALIEN_V_SEP,
                kind: kind_for_row(row),
                dying: None,
            })
        })
        .collect();

    WaveState {
        ship: Some(spawn_ship(&field)),
        total_aliens: aliens.len(),
        aliens,
        bolts: Vec::new(),
        missiles: Vec::new(),
        missiles_left: SHIP_MISSILES,
        lives: SHIP_LIVES,
        score: 0,
        outcome: Outcome::Undecided,
        march: March::Right,
        step_timer: 0.0,
        steps_until_fire: rng.gen_range(1..=BOLT_RATE),
        anim_frame: false,
        field,
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub fn alive_aliens(state: &WaveState) -> usize {
    state.aliens.iter().filter(|a| a.dying.is_none()).count()
}

/// Seconds between formation steps.  Shrinks with the speed modifier and
/// with the fraction of the formation already destroyed.
pub fn step_interval(state: &WaveState, speed_modifier: f64) -> f64 {
    let fraction = if state.total_aliens == 0 {
        MIN_SPEED_FRACTION
    } else {
        alive_aliens(state) as f64 / state.total_aliens as f64
    };
    speed_modifier * fraction.max(MIN_SPEED_FRACTION)
}

pub fn can_fire_bolt(state: &WaveState) -> bool {
    state.ship.is_some() && !state.bolts.iter().any(|b| b.owner == BoltOwner::Ship)
}

pub fn can_fire_missile(state: &WaveState) -> bool {
    state.ship.is_some() && state.missiles_left > 0 && state.missiles.is_empty()
}

// ── Input-driven transitions (pure) ──────────────────────────────────────────

pub fn move_ship_left(state: &WaveState, dt: f64) -> WaveState {
    let Some(ship) = &state.ship else {
        return state.clone();
    };
    let new_x = (ship.x - SHIP_SPEED * dt as f32).max(2.0);
    WaveState {
        ship: Some(Ship { x: new_x, ..ship.clone() }),
        ..state.clone()
    }
}

pub fn move_ship_right(state: &WaveState, dt: f64) -> WaveState {
    let Some(ship) = &state.ship else {
        return state.clone();
    };
    let new_x = (ship.x + SHIP_SPEED * dt as f32).min(state.field.width as f32 - 3.0);
    WaveState {
        ship: Some(Ship { x: new_x, ..ship.clone() }),
        ..state.clone()
    }
}

/// Fire a bolt from the ship.  Only one ship bolt may be in flight.
pub fn fire_bolt(state: &WaveState) -> WaveState {
    let Some(ship) = &state.ship else {
        return state.clone();
    };
    if !can_fire_bolt(state) {
        return state.clone();
    }
    let mut bolts = state.bolts.clone();
    bolts.push(Bolt {
        x: ship.x.round() as i32,
        y: (ship.y - 1) as f32,
        owner: BoltOwner::Ship,
    });
    WaveState {
        bolts,
        ..state.clone()
    }
}

/// Launch a missile: one in flight at a time, limited per wave.
pub fn fire_missile(state: &WaveState) -> WaveState {
    let Some(ship) = &state.ship else {
        return state.clone();
    };
    if !can_fire_missile(state) {
        return state.clone();
    }
    let mut missiles = state.missiles.clone();
    missiles.push(Missile {
        x: ship.x.round() as i32,
        y: (ship.y - 1) as f32,
    });
    WaveState {
        missiles,
        missiles_left: state.missiles_left - 1,
        ..state.clone()
    }
}

/// Respawn the ship after a lost life and clear the field of projectiles.
pub fn resume(state: &WaveState) -> WaveState {
    if state.lives == 0 || state.ship.is_some() {
        return state.clone();
    }
    WaveState {
        ship: Some(spawn_ship(&state.field)),
        bolts: Vec::new(),
        missiles: Vec::new(),
        ..state.clone()
    }
}

// ── Formation ────────────────────────────────────────────────────────────────

/// Advance the formation one step: sideways, or down and reverse at a wall.
/// Counts down to the next alien shot and fires it when due.
pub fn march(state: &WaveState, rng: &mut impl Rng) -> (WaveState, Vec<Effect>) {
    let mut effects = Vec::new();
    let alive: Vec<&Alien> = state.aliens.iter().filter(|a| a.dying.is_none()).collect();
    if alive.is_empty() {
        return (state.clone(), effects);
    }

    let at_wall = match state.march {
        March::Right => alive.iter().any(|a| a.x + 1 > max_alien_x(&state.field)),
        March::Left => alive.iter().any(|a| a.x - 1 < min_alien_x(&state.field)),
    };

    let (dx, dy, march) = match (state.march, at_wall) {
        (March::Right, false) => (1, 0, March::Right),
        (March::Left, false) => (-1, 0, March::Left),
        (March::Right, true) => (0, 1, March::Left),
        (March::Left, true) => (0, 1, March::Right),
    };

    let aliens: Vec<Alien> = state
        .aliens
        .iter()
        .map(|a| Alien {
            x: a.x + dx,
            y: a.y + dy,
            ..a.clone()
        })
        .collect();

    let mut bolts = state.bolts.clone();
    let mut steps_until_fire = state.steps_until_fire.saturating_sub(1);
    if steps_until_fire == 0 {
        if let Some(shooter) = pick_shooter(&aliens, rng) {
            bolts.push(Bolt {
                x: shooter.x,
                y: (shooter.y + 1) as f32,
                owner: BoltOwner::Alien,
            });
            effects.push(Effect::AlienFire);
        }
        steps_until_fire = rng.gen_range(1..=BOLT_RATE);
    }

    let next = WaveState {
        aliens,
        bolts,
        march,
        steps_until_fire,
        anim_frame: !state.anim_frame,
        ..state.clone()
    };
    (next, effects)
}

/// A random column's bottom-most living alien.
fn pick_shooter<'a>(aliens: &'a [Alien], rng: &mut impl Rng) -> Option<&'a Alien> {
    let mut columns: Vec<i32> = aliens
        .iter()
        .filter(|a| a.dying.is_none())
        .map(|a| a.x)
        .collect();
    columns.sort_unstable();
    columns.dedup();
    if columns.is_empty() {
        return None;
    }
    let column = columns[rng.gen_range(0..columns.len())];
    aliens
        .iter()
        .filter(|a| a.dying.is_none() && a.x == column)
        .max_by_key(|a| a.y)
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Rows a projectile passed through moving from `from` to `to`, inclusive.
fn swept_rows(from: f32, to: f32) -> (i32, i32) {
    let a = from.round() as i32;
    let b = to.round() as i32;
    (a.min(b), a.max(b))
}

fn kill(alien: &mut Alien, score: &mut u32, effects: &mut Vec<Effect>) {
    alien.dying = Some(DEATH_ANIMATION);
    *score += alien_points(alien.kind);
    effects.push(Effect::AlienDeath);
}

fn hits_alien(x: i32, rows: (i32, i32), alien: &Alien) -> bool {
    alien.dying.is_none() && (x - alien.x).abs() <= 1 && alien.y >= rows.0 && alien.y <= rows.1
}

/// Move every bolt and missile, resolve hits, and drop whatever left the
/// play area.
pub fn advance_projectiles(state: &WaveState, dt: f64) -> (WaveState, Vec<Effect>) {
    let mut effects = Vec::new();
    let dt = dt as f32;
    let top = play_top(&state.field) as f32;
    let bottom = play_bottom(&state.field) as f32;

    let mut aliens = state.aliens.clone();
    let mut score = state.score;
    // Missiles pierce: every alien on the swept path dies.
    let missiles: Vec<Missile> = state
        .missiles
        .iter()
        .filter_map(|m| {
            let new_y = m.y - MISSILE_SPEED * dt;
            let rows = swept_rows(m.y, new_y);
            for alien in aliens.iter_mut().filter(|a| hits_alien(m.x, rows, a)) {
                kill(alien, &mut score, &mut effects);
            }
            (new_y >= top).then(|| Missile { y: new_y, ..m.clone() })
        })
        .collect();

    let mut ship = state.ship.clone();
    let mut lives = state.lives;
    let mut ship_hit = false;
    let mut bolts: Vec<Bolt> = Vec::new();

    for bolt in &state.bolts {
        match bolt.owner {
            BoltOwner::Ship => {
                let new_y = bolt.y - SHIP_BOLT_SPEED * dt;
                let rows = swept_rows(bolt.y, new_y);
                // The lowest alien in the path takes the hit.
                let target = aliens
                    .iter_mut()
                    .filter(|a| hits_alien(bolt.x, rows, a))
                    .max_by_key(|a| a.y);
                match target {
                    Some(alien) => kill(alien, &mut score, &mut effects),
                    None if new_y >= top => bolts.push(Bolt { y: new_y, ..bolt.clone() }),
                    None => {}
                }
            }
            BoltOwner::Alien => {
                let new_y = bolt.y + ALIEN_BOLT_SPEED * dt;
                let rows = swept_rows(bolt.y, new_y);
                let hit = ship.as_ref().is_some_and(|s| {
                    (bolt.x - s.x.round() as i32).abs() <= 1 && rows.0 <= s.y + 1 && rows.1 >= s.y
                });
                if hit {
                    ship_hit = true;
                } else if new_y <= bottom {
                    bolts.push(Bolt { y: new_y, ..bolt.clone() });
                }
            }
        }
    }

    let missiles = if ship_hit {
        ship = None;
        lives = lives.saturating_sub(1);
        bolts.clear();
        effects.push(Effect::ShipDeath);
        Vec::new()
    } else {
        missiles
    };

    let next = WaveState {
        ship,
        aliens,
        bolts,
        missiles,
        lives,
        score,
        ..state.clone()
    };
    (next, effects)
}

/// Count down death animations and remove the aliens whose animation ended.
pub fn age_dying(state: &WaveState, dt: f64) -> WaveState {
    let aliens: Vec<Alien> = state
        .aliens
        .iter()
        .filter_map(|a| match a.dying {
            None => Some(a.clone()),
            Some(left) if left - dt > 0.0 => Some(Alien {
                dying: Some(left - dt),
                ..a.clone()
            }),
            Some(_) => None,
        })
        .collect();
    WaveState {
        aliens,
        ..state.clone()
    }
}

// ── Per-frame step (RNG injected) ────────────────────────────────────────────

/// Advance the wave by one frame.  A wave whose ship is down, or whose
/// outcome is decided, is frozen and returned unchanged.
pub fn step(
    state: &WaveState,
    controls: Controls,
    dt: f64,
    speed_modifier: f64,
    rng: &mut impl Rng,
) -> (WaveState, Vec<Effect>) {
    if state.outcome != Outcome::Undecided || state.ship.is_none() || state.lives == 0 {
        return (state.clone(), Vec::new());
    }
    let mut effects = Vec::new();

    // ── 1. Death animations ──────────────────────────────────────────────────
    let mut next = age_dying(state, dt);

    // ── 2. Ship ──────────────────────────────────────────────────────────────
    if controls.left && !controls.right {
        next = move_ship_left(&next, dt);
    } else if controls.right && !controls.left {
        next = move_ship_right(&next, dt);
    }
    if controls.fire && can_fire_bolt(&next) {
        next = fire_bolt(&next);
        effects.push(Effect::ShipFire);
    }
    if controls.missile && can_fire_missile(&next) {
        next = fire_missile(&next);
        effects.push(Effect::MissileLaunch);
    }

    // ── 3. Formation ─────────────────────────────────────────────────────────
    next.step_timer += dt;
    let interval = step_interval(&next, speed_modifier);
    let mut steps = 0;
    while next.step_timer >= interval && steps < MAX_STEPS_PER_FRAME {
        next.step_timer -= interval;
        let (marched, fired) = march(&next, rng);
        next = marched;
        effects.extend(fired);
        steps += 1;
    }
    // Time the cap could not spend is dropped, not banked.
    next.step_timer = next.step_timer.min(interval);

    // ── 4. Projectiles & collisions ──────────────────────────────────────────
    let (moved, hits) = advance_projectiles(&next, dt);
    next = moved;
    effects.extend(hits);

    // ── 5. Invasion ──────────────────────────────────────────────────────────
    let line = defense_line(&next.field);
    if next.aliens.iter().any(|a| a.dying.is_none() && a.y >= line) {
        if next.ship.is_some() {
            effects.push(Effect::ShipDeath);
        }
        next.ship = None;
        next.lives = 0;
    }

    // ── 6. Victory ───────────────────────────────────────────────────────────
    if next.lives > 0 && next.aliens.is_empty() {
        next.outcome = Outcome::Won;
    }

    (next, effects)
}
