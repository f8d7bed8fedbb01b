use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use alien_invaders::input::*;

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
}

fn release(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
}

// ── Key mapping ──────────────────────────────────────────────────────────────

#[test]
fn key_codes_map_to_game_keys() {
    assert_eq!(Key::from_code(&KeyCode::Enter), Some(Key::Enter));
    assert_eq!(Key::from_code(&KeyCode::Char(' ')), Some(Key::Space));
    assert_eq!(Key::from_code(&KeyCode::Left), Some(Key::Left));
    assert_eq!(Key::from_code(&KeyCode::Char('a')), Some(Key::Left));
    assert_eq!(Key::from_code(&KeyCode::Right), Some(Key::Right));
    assert_eq!(Key::from_code(&KeyCode::Char('D')), Some(Key::Right));
    assert_eq!(Key::from_code(&KeyCode::Up), Some(Key::Up));
    assert_eq!(Key::from_code(&KeyCode::Char('m')), Some(Key::Mute));
    assert_eq!(Key::from_code(&KeyCode::Char('x')), None);
}

// ── KeySnapshot ──────────────────────────────────────────────────────────────

#[test]
fn snapshot_counts_named_and_unnamed_keys() {
    let mut s = KeySnapshot::with(&[Key::Enter, Key::Left]);
    s.other = 2;
    assert!(s.is_key_down(Key::Enter));
    assert!(!s.is_key_down(Key::Space));
    assert_eq!(s.key_count(), 4);
    assert_eq!(KeySnapshot::none().key_count(), 0);
}

// ── Keyboard ─────────────────────────────────────────────────────────────────

#[test]
fn press_then_release() {
    let mut kb = Keyboard::new();
    kb.begin_frame();
    kb.handle(&press(KeyCode::Enter));
    assert!(kb.snapshot().is_key_down(Key::Enter));
    assert_eq!(kb.snapshot().key_count(), 1);

    kb.begin_frame();
    kb.handle(&release(KeyCode::Enter));
    assert_eq!(kb.snapshot().key_count(), 0);
}

#[test]
fn held_key_expires_after_hold_window() {
    let mut kb = Keyboard::new();
    kb.begin_frame();
    kb.handle(&press(KeyCode::Char(' ')));

    for _ in 0..HOLD_WINDOW {
        kb.begin_frame();
        assert!(kb.snapshot().is_key_down(Key::Space));
    }
    kb.begin_frame();
    assert!(!kb.snapshot().is_key_down(Key::Space));
}

#[test]
fn repeat_keeps_key_alive() {
    let mut kb = Keyboard::new();
    kb.begin_frame();
    kb.handle(&press(KeyCode::Left));
    for _ in 0..20 {
        kb.begin_frame();
        kb.handle(&KeyEvent::new_with_kind(
            KeyCode::Left,
            KeyModifiers::NONE,
            KeyEventKind::Repeat,
        ));
    }
    assert!(kb.snapshot().is_key_down(Key::Left));
}

#[test]
fn aliases_each_count_as_a_key() {
    let mut kb = Keyboard::new();
    kb.begin_frame();
    kb.handle(&press(KeyCode::Left));
    kb.handle(&press(KeyCode::Char('a')));
    kb.handle(&press(KeyCode::Char('z')));
    let s = kb.snapshot();
    assert!(s.is_key_down(Key::Left));
    assert_eq!(s.key_count(), 3);
}

// ── Terminals without release events ─────────────────────────────────────────

const FRAME_30: Duration = Duration::from_nanos(33_333_333);

fn repeat(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Repeat)
}

#[test]
fn grace_covers_repeat_delay() {
    assert_eq!(Keyboard::new().grace(), HOLD_WINDOW);
    let kb = Keyboard::without_release_events(FRAME_30);
    assert!(kb.grace() as f64 * FRAME_30.as_secs_f64() >= REPEAT_DELAY.as_secs_f64());
}

#[test]
fn held_key_fires_once_across_repeat_delay() {
    let mut kb = Keyboard::without_release_events(FRAME_30);
    let mut d = Debounce::default();
    let mut fired = Vec::new();

    // Press at frame 0, silence while the OS waits, then repeats every
    // other frame from frame 15.
    for frame in 0..60 {
        kb.begin_frame();
        if frame == 0 {
            kb.handle(&press(KeyCode::Char(' ')));
        } else if frame >= 15 && (frame - 15) % 2 == 0 {
            kb.handle(&repeat(KeyCode::Char(' ')));
        }
        if d.pressed(&kb.snapshot(), Key::Space) {
            fired.push(frame);
        }
    }
    assert_eq!(fired, vec![0]);
}

#[test]
fn quiet_key_stops_acting_but_still_counts() {
    let mut kb = Keyboard::without_release_events(FRAME_30);
    kb.begin_frame();
    kb.handle(&press(KeyCode::Left));
    for _ in 0..HOLD_WINDOW + 1 {
        kb.begin_frame();
    }
    let s = kb.snapshot();
    assert!(!s.is_key_down(Key::Left));
    assert_eq!(s.settling, 1);
    assert_eq!(s.key_count(), 1);

    for _ in 0..kb.grace() {
        kb.begin_frame();
    }
    assert_eq!(kb.snapshot().key_count(), 0);
}

#[test]
fn release_still_clears_immediately() {
    let mut kb = Keyboard::without_release_events(FRAME_30);
    kb.begin_frame();
    kb.handle(&press(KeyCode::Enter));
    kb.begin_frame();
    kb.handle(&release(KeyCode::Enter));
    assert_eq!(kb.snapshot().key_count(), 0);
}

// ── Debounce ─────────────────────────────────────────────────────────────────

#[test]
fn debounce_fires_once_while_held() {
    let mut d = Debounce::default();
    let held = KeySnapshot::with(&[Key::Enter]);
    let fired = (0..10).filter(|_| d.pressed(&held, Key::Enter)).count();
    assert_eq!(fired, 1);
}

#[test]
fn debounce_rearms_after_release() {
    let mut d = Debounce::default();
    let held = KeySnapshot::with(&[Key::Enter]);
    assert!(d.pressed(&held, Key::Enter));
    assert!(!d.pressed(&KeySnapshot::none(), Key::Enter));
    assert!(d.pressed(&held, Key::Enter));
}

#[test]
fn debounce_ignores_other_keys_but_counts_them() {
    let mut d = Debounce::default();
    assert!(!d.pressed(&KeySnapshot::with(&[Key::Space]), Key::Enter));
    assert_eq!(d.last_count(), 1);
    // Enter joins a key that was already down: not an idle-to-press edge.
    assert!(!d.pressed(&KeySnapshot::with(&[Key::Space, Key::Enter]), Key::Enter));
}

#[test]
fn observe_tracks_count_without_firing() {
    let mut d = Debounce::default();
    d.observe(&KeySnapshot::with(&[Key::Enter]));
    assert_eq!(d.last_count(), 1);
    assert!(!d.pressed(&KeySnapshot::with(&[Key::Enter]), Key::Enter));
}

#[test]
fn debounces_are_independent() {
    let mut advance = Debounce::default();
    let mut mute = Debounce::default();
    let both = KeySnapshot::with(&[Key::Enter, Key::Mute]);
    assert!(advance.pressed(&both, Key::Enter));
    assert!(mute.pressed(&both, Key::Mute));
}
