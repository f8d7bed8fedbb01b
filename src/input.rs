/// Keyboard sampling.
///
/// The game only ever asks two questions of the keyboard each frame: is a
/// given key down, and how many keys are down in total.  `InputSource`
/// captures exactly that, so the session and the wave can be driven by a
/// live terminal or by a hand-built `KeySnapshot` in tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// A key press/repeat is considered "held" if it arrived within this many
/// frames.  Once OS key-repeat is running (≥ 15 Hz) a 4-frame window
/// (≈133 ms at 30 FPS) is refreshed before it lapses.  The longer wait for
/// the first repeat is bridged by `Keyboard::without_release_events`.
pub const HOLD_WINDOW: u64 = 4;

/// Longest common OS delay between a key press and its first repeat.
pub const REPEAT_DELAY: Duration = Duration::from_millis(600);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Left,
    Right,
    Up,
    Mute,
}

impl Key {
    /// Map a terminal key code onto a named game key.  Left/right also
    /// answer to A/D like the menu hint advertises.
    pub fn from_code(code: &KeyCode) -> Option<Key> {
        match code {
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Char(' ') => Some(Key::Space),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
            KeyCode::Up => Some(Key::Up),
            KeyCode::Char('m') | KeyCode::Char('M') => Some(Key::Mute),
            _ => None,
        }
    }
}

pub trait InputSource {
    fn is_key_down(&self, key: Key) -> bool;
    /// Total number of keys down, named or not.
    fn key_count(&self) -> usize;
}

/// One frame's worth of keyboard state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeySnapshot {
    pub down: HashSet<Key>,
    /// Keys that are held but have no game meaning.
    pub other: usize,
    /// Keys that went quiet but may still be held, waiting on the first
    /// repeat.  Counted, never down.
    pub settling: usize,
}

impl KeySnapshot {
    pub fn none() -> Self {
        KeySnapshot::default()
    }

    pub fn with(keys: &[Key]) -> Self {
        KeySnapshot {
            down: keys.iter().copied().collect(),
            ..KeySnapshot::default()
        }
    }
}

impl InputSource for KeySnapshot {
    fn is_key_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    fn key_count(&self) -> usize {
        self.down.len() + self.other + self.settling
    }
}

/// Folds terminal key events into held-key state.
///
/// Each key maps to the frame it was last seen (press or repeat).  A key
/// is down for `HOLD_WINDOW` frames after that.  With keyboard-enhancement
/// terminals the release event removes it right away.  Elsewhere a quiet
/// key keeps counting toward `key_count` until `grace` frames have passed,
/// long enough to bridge the OS delay before key-repeat starts.
#[derive(Debug)]
pub struct Keyboard {
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    grace: u64,
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard {
            key_frame: HashMap::new(),
            frame: 0,
            grace: HOLD_WINDOW,
        }
    }
}

impl Keyboard {
    /// For terminals that report key releases.
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// For terminals that only report presses and repeats, paced at
    /// `frame` per frame.
    pub fn without_release_events(frame: Duration) -> Self {
        let frames = REPEAT_DELAY.as_secs_f64() / frame.as_secs_f64().max(f64::EPSILON);
        Keyboard {
            grace: (frames.ceil() as u64).max(HOLD_WINDOW),
            ..Keyboard::default()
        }
    }

    pub fn grace(&self) -> u64 {
        self.grace
    }

    /// Start a new frame.  Call before feeding that frame's events.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        let frame = self.frame;
        let grace = self.grace;
        self.key_frame
            .retain(|_, &mut last| frame.saturating_sub(last) <= grace);
    }

    pub fn handle(&mut self, event: &KeyEvent) {
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.key_frame.insert(event.code, self.frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&event.code);
            }
        }
    }

    pub fn snapshot(&self) -> KeySnapshot {
        let mut snapshot = KeySnapshot::none();
        for (code, &last) in &self.key_frame {
            if self.frame.saturating_sub(last) > HOLD_WINDOW {
                snapshot.settling += 1;
                continue;
            }
            match Key::from_code(code) {
                // A and Left both map to Left; count each physical key.
                Some(key) if snapshot.down.insert(key) => {}
                _ => snapshot.other += 1,
            }
        }
        snapshot
    }
}

/// Edge detector for session keys.
///
/// Remembers the previous frame's total key count.  A key fires only when
/// the keyboard was completely idle last frame and that key is down now,
/// so holding it fires once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Debounce {
    last_count: usize,
}

impl Debounce {
    /// Check `key` and record this frame's count, fired or not.
    pub fn pressed(&mut self, input: &dyn InputSource, key: Key) -> bool {
        let count = input.key_count();
        let fired = count > 0 && self.last_count == 0 && input.is_key_down(key);
        self.last_count = count;
        fired
    }

    /// Record this frame's count without checking any key.
    pub fn observe(&mut self, input: &dyn InputSource) {
        self.last_count = input.key_count();
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }
}
