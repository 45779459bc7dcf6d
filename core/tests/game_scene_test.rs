mod common;

use common::*;
use mayhem_core::boot::BootState;
use mayhem_core::config::{BootConfig, ShellConfig};
use mayhem_core::emulator::{CanvasGeometry, EmulatorContext, PcmQueue, SharedFramebuffer};
use mayhem_core::error::{FrameError, ShellError};
use mayhem_core::geometry::Vec2;
use mayhem_core::input::ButtonId;
use mayhem_core::scene::{Game, GameScene, RgbaFrame, Scene};

const SIDE: usize = 100;
const BRIGHT: u8 = 200;
const DEMO: u8 = 70;
const DARK: u8 = 20;

const FIRE_POS: Vec2 = Vec2::new(1.60, 0.80);
const SKIP_POS: Vec2 = Vec2::new(1.70, 0.10);
const FRAME: f32 = 1.0 / 60.0;

struct Harness {
    scene: GameScene,
    fb: SharedFramebuffer,
    log: CallLog,
}

fn shell_config() -> ShellConfig {
    // 100x100 canvas: a channel value of 200 sums to 2M, 70 to 700k, 20 to 200k.
    ShellConfig {
        boot: BootConfig {
            high_threshold: 1_000_000,
            mid_threshold: 500_000,
            ..BootConfig::default()
        },
        ..ShellConfig::default()
    }
}

fn harness() -> Harness {
    harness_with(shell_config())
}

fn harness_with(config: ShellConfig) -> Harness {
    let (emu, log) = RecordingEmulator::new();
    let fb = SharedFramebuffer::new();
    fb.init(CanvasGeometry::packed(SIDE, SIDE, 4)).unwrap();
    let ctx = EmulatorContext::new(Box::new(emu), fb.clone(), PcmQueue::new());
    let mut scene = GameScene::new(ctx, &config);
    scene.init(16.0 / 9.0, 1.0);
    Harness { scene, fb, log }
}

impl Harness {
    fn frame(&mut self, value: u8) -> Result<(), ShellError> {
        self.fb.publish(&vec![value; SIDE * SIDE * 4]).unwrap();
        self.scene.update(FRAME)
    }

    fn boot_from_snapshot(&mut self) {
        self.log.set_snapshot_available(true);
        self.frame(BRIGHT).unwrap();
        self.frame(BRIGHT).unwrap();
        assert_eq!(self.scene.boot_state(), BootState::Game);
        self.log.take();
    }
}

// =================================================================
// Frames drive the boot
// =================================================================

#[test]
fn test_frames_drive_sequencer() {
    let mut h = harness();
    h.frame(BRIGHT).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::AfterBlue);
    h.frame(DARK).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::DemoPressSpace);
    h.frame(DEMO).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::DemoReleaseSpace);

    // No new frame, but the release state still advances.
    h.scene.update(FRAME).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::AfterDemo);
    assert_eq!(h.log.keys(), vec![Call::Press(SPACE), Call::Release(SPACE)]);
}

#[test]
fn test_unchanged_frame_is_not_resampled() {
    let mut h = harness();
    h.frame(DARK).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::Blue);
    for _ in 0..3 {
        h.scene.update(FRAME).unwrap();
    }
    assert_eq!(h.scene.boot_state(), BootState::Blue);
}

#[test]
fn test_converted_screen_is_rgba() {
    let mut h = harness();
    {
        let mut canvas = h.fb.lock().unwrap();
        for px in canvas.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&[0x10, 0x20, 0x30, 0x00]);
        }
    }
    h.scene.update(FRAME).unwrap();

    let screen = h.scene.screen();
    assert_eq!((screen.width(), screen.height()), (SIDE, SIDE));
    assert_eq!(&screen.pixels()[..4], &[0x30, 0x20, 0x10, 0xFF]);

    let mut target = RgbaFrame::new(50, 50);
    h.scene.render(&mut target);
    assert_eq!(&target.pixels()[..4], &[0x30, 0x20, 0x10, 0xFF]);
}

#[test]
fn test_bad_geometry_is_fatal() {
    let mut h = harness();
    h.fb.init(CanvasGeometry {
        width: SIDE,
        height: SIDE,
        pitch: 10,
        bytes_per_pixel: 4,
        visible_width: SIDE,
        visible_height: SIDE,
    })
    .unwrap();
    h.fb.publish(&[0; 1000]).unwrap();

    let err = h.scene.update(FRAME).unwrap_err();
    assert!(matches!(
        err,
        ShellError::Fatal(FrameError::PitchTooSmall { pitch: 10, .. })
    ));
}

// =================================================================
// Touch routing
// =================================================================

#[test]
fn test_touches_ignored_while_booting() {
    let mut h = harness();
    h.scene.touch_down(1, FIRE_POS);
    h.scene.touch_up(1, FIRE_POS);
    assert!(h.scene.pressed_buttons().is_empty());
    assert!(h.log.keys().is_empty());
}

#[test]
fn test_touches_reach_router_once_booted() {
    let mut h = harness();
    h.boot_from_snapshot();

    h.scene.touch_down(1, FIRE_POS);
    assert!(h.scene.pressed_buttons().contains(ButtonId::Fire));
    h.scene.touch_up(1, FIRE_POS);
    assert_eq!(h.log.keys(), vec![Call::Press(FIRE), Call::Release(FIRE)]);
}

#[test]
fn test_pause_releases_held_buttons() {
    let mut h = harness();
    h.boot_from_snapshot();
    h.scene.touch_down(1, FIRE_POS);
    h.scene.touch_down(2, SKIP_POS);

    h.scene.pause();
    assert!(h.scene.is_paused());
    assert!(h.scene.pressed_buttons().is_empty());
    assert!(!h.scene.reset_gesture().is_holding());
    assert_eq!(h.log.count(&Call::Release(FIRE)), 1);
    assert_eq!(h.log.count(&Call::Release(SKIP)), 1);

    let clock = h.scene.clock();
    h.scene.update(10.0).unwrap();
    assert_eq!(h.scene.clock(), clock);

    h.scene.resume();
    assert!(!h.scene.is_paused());
}

// =================================================================
// Long-press reset
// =================================================================

#[test]
fn test_short_hold_does_not_reset() {
    let mut h = harness();
    h.boot_from_snapshot();

    h.scene.touch_down(3, SKIP_POS);
    h.scene.update(4.99).unwrap();
    h.scene.touch_up(3, SKIP_POS);
    h.scene.update(1.0).unwrap();

    assert_eq!(h.scene.boot_state(), BootState::Game);
    assert_eq!(h.log.count(&Call::HardReset), 0);
}

#[test]
fn test_long_hold_resets_once() {
    let mut h = harness();
    h.boot_from_snapshot();

    h.scene.touch_down(3, SKIP_POS);
    h.scene.touch_down(4, FIRE_POS);
    assert!(h.scene.reset_gesture().is_holding());
    h.log.take();

    h.scene.update(5.01).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::Blue);
    assert!(h.scene.pressed_buttons().is_empty());
    assert_eq!(
        h.log.all()[..3],
        [Call::ClearKeyboard, Call::HardReset, Call::RemoveSnapshot]
    );

    // Still holding: no second reset until the finger lifts and comes back.
    h.scene.update(10.0).unwrap();
    assert_eq!(h.log.count(&Call::HardReset), 1);
}

#[test]
fn test_reset_clears_visible_frame() {
    let mut h = harness();
    h.boot_from_snapshot();
    h.fb.publish(&vec![BRIGHT; SIDE * SIDE * 4]).unwrap();

    h.scene.hard_reset().unwrap();
    let canvas = h.fb.lock().unwrap();
    assert!(canvas.pixels().iter().all(|&b| b == 0));
}

#[test]
fn test_reset_hold_works_before_boot_completes() {
    let mut h = harness();
    h.frame(BRIGHT).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::AfterBlue);

    h.scene.touch_down(9, SKIP_POS);
    h.scene.update(6.0).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::Blue);
    assert_eq!(h.log.count(&Call::HardReset), 1);
}

#[test]
fn test_watchdog_resets_stalled_boot() {
    let mut config = shell_config();
    config.boot.watchdog_secs = Some(3.0);
    let mut h = harness_with(config);

    h.frame(BRIGHT).unwrap();
    h.frame(BRIGHT).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::AfterBlue);

    h.scene.update(2.0).unwrap();
    assert_eq!(h.log.count(&Call::HardReset), 0);

    h.scene.update(1.5).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::Blue);
    assert!(h.scene.pressed_buttons().is_empty());
    assert_eq!(h.log.count(&Call::HardReset), 1);
    assert_eq!(h.log.count(&Call::RemoveSnapshot), 1);
    assert!(h.fb.lock().unwrap().pixels().iter().all(|&b| b == 0));

    // The re-armed boot gets a fresh allowance.
    h.scene.update(2.0).unwrap();
    assert_eq!(h.log.count(&Call::HardReset), 1);
}

#[test]
fn test_watchdog_off_by_default() {
    let mut h = harness();
    h.frame(BRIGHT).unwrap();
    h.frame(BRIGHT).unwrap();
    h.scene.update(600.0).unwrap();
    assert_eq!(h.scene.boot_state(), BootState::AfterBlue);
    assert_eq!(h.log.count(&Call::HardReset), 0);
}

// =================================================================
// Host
// =================================================================

#[test]
fn test_game_routes_screen_coordinates() {
    let h = harness();
    h.log.set_snapshot_available(true);
    let (fb, log) = (h.fb.clone(), h.log.clone());

    let mut game: Game<GameScene> = Game::new();
    game.init(1920, 1080, 1920, 1080);
    game.set_scene(Some(h.scene));
    for _ in 0..2 {
        fb.publish(&vec![BRIGHT; SIDE * SIDE * 4]).unwrap();
        game.update(FRAME).unwrap();
    }
    assert_eq!(game.scene().map(GameScene::boot_state), Some(BootState::Game));
    log.take();

    game.touch_down(1, 1728.0, 864.0);
    assert_eq!(log.keys(), vec![Call::Press(FIRE)]);
    game.touch_up(1, 1728.0, 864.0);

    // Portrait: buttons follow the rotated local space.
    game.resize(1080, 1920);
    game.touch_down(2, 972.0, 1536.0);
    assert_eq!(log.count(&Call::Press(FIRE)), 2);

    game.shutdown();
    assert!(game.scene().is_none());
    assert_eq!(log.count(&Call::Release(FIRE)), 2);
    assert!(log.all().contains(&Call::ClearKeyboard));
}
