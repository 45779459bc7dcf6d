mod common;

use std::collections::HashSet;

use common::*;
use mayhem_core::config::{ButtonPlacement, HitPolicy, InputConfig};
use mayhem_core::emulator::KeyCode;
use mayhem_core::geometry::Vec2;
use mayhem_core::input::{ButtonId, ButtonInputRouter, ButtonSet};

const LEFT_POS: Vec2 = Vec2::new(0.10, 0.78);
const RIGHT_POS: Vec2 = Vec2::new(0.36, 0.78);
const UP_POS: Vec2 = Vec2::new(0.23, 0.62);
const FIRE_POS: Vec2 = Vec2::new(1.60, 0.80);
const NOWHERE: Vec2 = Vec2::new(0.90, 0.40);

fn router() -> (ButtonInputRouter, RecordingEmulator, CallLog) {
    let (emu, log) = RecordingEmulator::new();
    (ButtonInputRouter::new(&InputConfig::default()), emu, log)
}

fn overlapping(policy: HitPolicy, placements: &[(ButtonId, f32)]) -> ButtonInputRouter {
    let config = InputConfig {
        hit_policy: policy,
        layout: placements
            .iter()
            .map(|&(id, x)| ButtonPlacement {
                id,
                position: Vec2::new(x, 0.5),
                size: Vec2::splat(0.4),
            })
            .collect(),
        ..InputConfig::default()
    };
    ButtonInputRouter::new(&config)
}

fn set(ids: &[ButtonId]) -> ButtonSet {
    ids.iter().copied().collect()
}

// =================================================================
// Single finger
// =================================================================

#[test]
fn test_tap_presses_and_releases() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, FIRE_POS);
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
    assert_eq!(router.owner(ButtonId::Fire), Some(1));

    router.touch_up(&mut emu, 1, FIRE_POS);
    assert!(router.pressed().is_empty());
    assert_eq!(router.owner(ButtonId::Fire), None);
    assert_eq!(log.keys(), vec![Call::Press(FIRE), Call::Release(FIRE)]);
}

#[test]
fn test_touch_outside_buttons_does_nothing() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, NOWHERE);
    router.touch_move(&mut emu, 1, Vec2::new(0.95, 0.45));
    router.touch_up(&mut emu, 1, NOWHERE);
    assert!(log.all().is_empty());
}

#[test]
fn test_lift_outside_still_releases() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 4, UP_POS);
    router.touch_up(&mut emu, 4, NOWHERE);
    assert!(router.pressed().is_empty());
    assert_eq!(log.keys(), vec![Call::Press(UP), Call::Release(UP)]);
}

#[test]
fn test_drag_between_buttons() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 0, LEFT_POS);
    router.touch_move(&mut emu, 0, Vec2::new(0.12, 0.80));
    router.touch_move(&mut emu, 0, NOWHERE);
    assert!(router.pressed().is_empty());

    router.touch_move(&mut emu, 0, RIGHT_POS);
    assert_eq!(router.pressed(), set(&[ButtonId::Right]));
    router.touch_move(&mut emu, 0, LEFT_POS);
    assert_eq!(router.pressed(), set(&[ButtonId::Left]));
    router.touch_up(&mut emu, 0, LEFT_POS);

    assert_eq!(
        log.keys(),
        vec![
            Call::Press(LEFT),
            Call::Release(LEFT),
            Call::Press(RIGHT),
            Call::Release(RIGHT),
            Call::Press(LEFT),
            Call::Release(LEFT),
        ]
    );
}

#[test]
fn test_reused_finger_id_drops_old_button() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 2, FIRE_POS);
    router.touch_down(&mut emu, 2, UP_POS);
    assert_eq!(router.pressed(), set(&[ButtonId::Up]));
    assert_eq!(
        log.keys(),
        vec![Call::Press(FIRE), Call::Release(FIRE), Call::Press(UP)]
    );
}

#[test]
fn test_repeat_down_on_held_button_is_silent() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, FIRE_POS);
    log.take();

    router.touch_down(&mut emu, 1, FIRE_POS);
    assert!(log.all().is_empty());
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
    assert_eq!(router.owner(ButtonId::Fire), Some(1));

    router.touch_up(&mut emu, 1, FIRE_POS);
    assert_eq!(log.keys(), vec![Call::Release(FIRE)]);
}

#[test]
fn test_repeat_down_all_matches_keeps_held_buttons() {
    let mut router = overlapping(
        HitPolicy::AllMatches,
        &[(ButtonId::Fire, 0.5), (ButtonId::SkipLevel, 0.6)],
    );
    let (mut emu, log) = RecordingEmulator::new();
    router.touch_down(&mut emu, 1, Vec2::new(0.55, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire, ButtonId::SkipLevel]));
    log.take();

    router.touch_down(&mut emu, 1, Vec2::new(0.55, 0.5));
    assert!(log.all().is_empty());

    // Only the part of the overlap the finger left is released.
    router.touch_down(&mut emu, 1, Vec2::new(0.35, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
    assert_eq!(log.keys(), vec![Call::Release(SKIP)]);
}

// =================================================================
// Press / release bookkeeping
// =================================================================

#[test]
fn test_press_and_release_are_idempotent() {
    let (mut router, mut emu, log) = router();
    assert!(router.press(&mut emu, 1, ButtonId::Fire));
    assert!(!router.press(&mut emu, 2, ButtonId::Fire));
    assert_eq!(router.owner(ButtonId::Fire), Some(1));

    assert!(router.release(&mut emu, ButtonId::Fire));
    assert!(!router.release(&mut emu, ButtonId::Fire));
    assert!(!router.release(&mut emu, ButtonId::Down));
    assert_eq!(log.keys(), vec![Call::Press(FIRE), Call::Release(FIRE)]);
}

#[test]
fn test_opposite_direction_supersedes() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, RIGHT_POS);
    router.touch_down(&mut emu, 2, LEFT_POS);

    assert_eq!(router.pressed(), set(&[ButtonId::Left]));
    assert_eq!(router.owner(ButtonId::Right), None);
    assert_eq!(router.owner(ButtonId::Left), Some(2));
    assert_eq!(
        log.keys(),
        vec![Call::Press(RIGHT), Call::Release(RIGHT), Call::Press(LEFT)]
    );

    // The finger that lost its button lifts without emitting anything.
    router.touch_up(&mut emu, 1, RIGHT_POS);
    assert_eq!(log.keys().len(), 3);
}

#[test]
fn test_superseded_finger_does_not_flip_back() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, RIGHT_POS);
    router.touch_down(&mut emu, 2, LEFT_POS);
    log.take();

    router.touch_move(&mut emu, 1, Vec2::new(0.37, 0.79));
    router.touch_move(&mut emu, 1, Vec2::new(0.35, 0.77));
    assert_eq!(router.pressed(), set(&[ButtonId::Left]));
    assert!(log.all().is_empty());
}

#[test]
fn test_release_all_and_clear() {
    let (mut router, mut emu, log) = router();
    router.touch_down(&mut emu, 1, LEFT_POS);
    router.touch_down(&mut emu, 2, FIRE_POS);
    log.take();

    router.release_all(&mut emu);
    assert!(router.pressed().is_empty());
    assert_eq!(log.count(&Call::Release(LEFT)), 1);
    assert_eq!(log.count(&Call::Release(FIRE)), 1);

    router.touch_down(&mut emu, 3, UP_POS);
    log.take();
    router.clear();
    assert!(router.pressed().is_empty());
    assert_eq!(router.owner(ButtonId::Up), None);
    assert!(log.all().is_empty());
}

// =================================================================
// Hit policy
// =================================================================

#[test]
fn test_first_match_presses_one_of_overlapping() {
    let mut router = overlapping(
        HitPolicy::FirstMatch,
        &[(ButtonId::Fire, 0.5), (ButtonId::SkipLevel, 0.6)],
    );
    let (mut emu, log) = RecordingEmulator::new();
    router.touch_down(&mut emu, 1, Vec2::new(0.55, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
    assert_eq!(router.bound_to(1).len(), 1);
    assert_eq!(log.keys(), vec![Call::Press(FIRE)]);
}

#[test]
fn test_all_matches_presses_every_overlapping() {
    let mut router = overlapping(
        HitPolicy::AllMatches,
        &[(ButtonId::Fire, 0.5), (ButtonId::SkipLevel, 0.6)],
    );
    let (mut emu, log) = RecordingEmulator::new();
    router.touch_down(&mut emu, 1, Vec2::new(0.55, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire, ButtonId::SkipLevel]));

    // Leaving one of the two releases only that one.
    router.touch_move(&mut emu, 1, Vec2::new(0.35, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
    router.touch_up(&mut emu, 1, Vec2::new(0.35, 0.5));
    assert_eq!(
        log.keys(),
        vec![
            Call::Press(FIRE),
            Call::Press(SKIP),
            Call::Release(SKIP),
            Call::Release(FIRE),
        ]
    );
}

#[test]
fn test_all_matches_with_overlapping_opposites_is_stable() {
    let mut router = overlapping(
        HitPolicy::AllMatches,
        &[(ButtonId::Left, 0.5), (ButtonId::Right, 0.55)],
    );
    let (mut emu, log) = RecordingEmulator::new();
    router.touch_down(&mut emu, 1, Vec2::new(0.52, 0.5));
    assert_eq!(router.pressed(), set(&[ButtonId::Right]));
    log.take();

    for dx in [0.01, 0.02, 0.0, 0.03] {
        router.touch_move(&mut emu, 1, Vec2::new(0.52 + dx, 0.5));
    }
    assert_eq!(router.pressed(), set(&[ButtonId::Right]));
    assert!(log.all().is_empty());
}

#[test]
fn test_relayout_moves_hitboxes() {
    let (mut router, mut emu, _log) = router();
    router.relayout(Vec2::new(16.0 / 9.0, 1.0), Vec2::new(32.0 / 9.0, 2.0));
    router.touch_down(&mut emu, 1, FIRE_POS);
    assert!(router.pressed().is_empty());
    router.touch_down(&mut emu, 2, Vec2::new(3.20, 1.60));
    assert_eq!(router.pressed(), set(&[ButtonId::Fire]));
}

// =================================================================
// Randomised multi-touch
// =================================================================

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn unit(&mut self) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0
    }
}

fn code_of(id: ButtonId) -> KeyCode {
    match id {
        ButtonId::Left => LEFT,
        ButtonId::Right => RIGHT,
        ButtonId::Up => UP,
        ButtonId::Down => DOWN,
        ButtonId::Fire => FIRE,
        ButtonId::SkipLevel => SKIP,
    }
}

/// Keys the emulator believes are down, replayed from the call log. Panics
/// if a key is pressed twice or released while up.
fn replay(log: &CallLog) -> HashSet<KeyCode> {
    let mut held = HashSet::new();
    for call in log.keys() {
        match call {
            Call::Press(code) => assert!(held.insert(code), "{code} pressed twice"),
            Call::Release(code) => assert!(held.remove(&code), "{code} released while up"),
            _ => unreachable!(),
        }
    }
    held
}

fn check_consistency(router: &ButtonInputRouter, log: &CallLog) {
    let pressed = router.pressed();
    for id in ButtonId::ALL {
        assert_eq!(pressed.contains(id), router.owner(id).is_some(), "{id:?}");
        if let Some(opposite) = id.opposite() {
            assert!(!(pressed.contains(id) && pressed.contains(opposite)));
        }
    }
    let expected: HashSet<KeyCode> = pressed.iter().map(code_of).collect();
    assert_eq!(replay(log), expected);
}

fn fuzz(policy: HitPolicy, seed: u64) {
    let centres = [LEFT_POS, RIGHT_POS, UP_POS, Vec2::new(0.23, 0.94), FIRE_POS, NOWHERE];
    let (mut emu, log) = RecordingEmulator::new();
    let mut router = ButtonInputRouter::new(&InputConfig {
        hit_policy: policy,
        ..InputConfig::default()
    });
    let mut rng = XorShift(seed);
    let mut down: HashSet<i32> = HashSet::new();

    for _ in 0..5_000 {
        let finger = rng.below(10) as i32;
        let pos = if rng.below(3) == 0 {
            Vec2::new(rng.unit() * 16.0 / 9.0, rng.unit())
        } else {
            centres[rng.below(centres.len() as u64) as usize]
        };
        match (down.contains(&finger), rng.below(4)) {
            (false, _) => {
                router.touch_down(&mut emu, finger, pos);
                down.insert(finger);
            }
            (true, 0) => {
                router.touch_up(&mut emu, finger, pos);
                down.remove(&finger);
                assert!(router.bound_to(finger).is_empty());
            }
            (true, _) => router.touch_move(&mut emu, finger, pos),
        }
        if policy == HitPolicy::FirstMatch {
            assert!(router.bound_to(finger).len() <= 1);
        }
        check_consistency(&router, &log);
    }

    router.release_all(&mut emu);
    assert!(router.pressed().is_empty());
    assert!(replay(&log).is_empty());
}

#[test]
fn test_random_touches_first_match() {
    fuzz(HitPolicy::FirstMatch, 0x9E37_79B9_7F4A_7C15);
}

#[test]
fn test_random_touches_all_matches() {
    fuzz(HitPolicy::AllMatches, 0xD1B5_4A32_D192_ED03);
}
