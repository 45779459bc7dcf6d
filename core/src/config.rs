//! Tunables for the boot sequencer and the touch overlay.
//!
//! All types deserialize with `#[serde(default)]`, so a config file only
//! needs to name what it overrides. Colour thresholds are calibrated against
//! the reference resolution; set `reference_pixels` to have them scaled to
//! other visible sizes.

use std::path::PathBuf;

use serde::Deserialize;

use crate::emulator::KeyCode;
use crate::geometry::Vec2;
use crate::input::ButtonId;

/// Visible pixel count the default thresholds were calibrated on
/// (384x272 emulated screen including border).
pub const REFERENCE_VISIBLE_PIXELS: u64 = 384 * 272;

/// Default "bright screen" channel-sum threshold.
pub const HIGH_THRESHOLD: u64 = 10_000_000;

/// Default "demo screen visible" channel-sum threshold.
pub const MID_THRESHOLD: u64 = 5_000_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub boot: BootConfig,
    pub input: InputConfig,
}

/// Resolved guard thresholds for one visible resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub high: u64,
    pub mid: u64,
}

/// Scan codes the boot script types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootKeys {
    pub space: KeyCode,
    pub f1: KeyCode,
    pub f3: KeyCode,
    pub f5: KeyCode,
}

impl Default for BootKeys {
    fn default() -> Self {
        Self {
            space: 57,
            f1: 59,
            f3: 61,
            f5: 63,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub high_threshold: u64,
    pub mid_threshold: u64,
    /// When set, thresholds are rescaled by `visible_pixels / reference_pixels`.
    pub reference_pixels: Option<u64>,
    /// Ticks a function key stays held before it is released.
    pub hold_ticks: u32,
    /// Space taps in the final step of the hack sequence.
    pub space_repeats: u32,
    pub warp_during_boot: bool,
    pub snapshot_fast_path: bool,
    pub save_snapshot_on_boot: bool,
    /// Reset and restart the boot when it has not reached the game after
    /// this many seconds. `None` waits forever.
    pub watchdog_secs: Option<f32>,
    /// Log a warning once the boot has been running this long.
    pub stall_warn_secs: f32,
    /// Image handed to the engine's autostart after a reset.
    pub disk: Option<PathBuf>,
    pub keys: BootKeys,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            high_threshold: HIGH_THRESHOLD,
            mid_threshold: MID_THRESHOLD,
            reference_pixels: None,
            hold_ticks: 2,
            space_repeats: 3,
            warp_during_boot: true,
            snapshot_fast_path: true,
            save_snapshot_on_boot: true,
            watchdog_secs: None,
            stall_warn_secs: 30.0,
            disk: None,
            keys: BootKeys::default(),
        }
    }
}

impl BootConfig {
    /// Thresholds as configured, before any resolution scaling.
    pub fn base_thresholds(&self) -> Thresholds {
        Thresholds {
            high: self.high_threshold,
            mid: self.mid_threshold,
        }
    }

    /// Thresholds for a frame with `visible_pixels` pixels.
    pub fn thresholds_for(&self, visible_pixels: u64) -> Thresholds {
        match self.reference_pixels {
            Some(reference) if reference > 0 => Thresholds {
                high: scale(self.high_threshold, visible_pixels, reference),
                mid: scale(self.mid_threshold, visible_pixels, reference),
            },
            _ => self.base_thresholds(),
        }
    }
}

fn scale(value: u64, num: u64, den: u64) -> u64 {
    ((value as u128 * num as u128) / den as u128) as u64
}

/// What a touch-down does when it lands on overlapping hitboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitPolicy {
    /// Press only the first matching button in layout order.
    #[default]
    FirstMatch,
    /// Press every matching button.
    AllMatches,
}

/// Scan code sent for each overlay button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ButtonKeys {
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub fire: KeyCode,
    pub skip_level: KeyCode,
}

impl Default for ButtonKeys {
    fn default() -> Self {
        Self {
            left: 75,
            right: 77,
            up: 72,
            down: 80,
            fire: 100,
            skip_level: 29,
        }
    }
}

impl ButtonKeys {
    pub fn code(&self, id: ButtonId) -> KeyCode {
        match id {
            ButtonId::Left => self.left,
            ButtonId::Right => self.right,
            ButtonId::Up => self.up,
            ButtonId::Down => self.down,
            ButtonId::Fire => self.fire,
            ButtonId::SkipLevel => self.skip_level,
        }
    }
}

/// Placement of one button in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ButtonPlacement {
    pub id: ButtonId,
    /// Centre of the button.
    pub position: Vec2,
    /// Width and height of the hitbox.
    pub size: Vec2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub hit_policy: HitPolicy,
    pub keys: ButtonKeys,
    /// Button whose long press resets the emulated machine.
    pub reset_button: ButtonId,
    pub reset_hold_secs: f32,
    /// Local-space size the placements below were authored for.
    pub layout_size: Vec2,
    pub layout: Vec<ButtonPlacement>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hit_policy: HitPolicy::FirstMatch,
            keys: ButtonKeys::default(),
            reset_button: ButtonId::SkipLevel,
            reset_hold_secs: 5.0,
            layout_size: Vec2::new(16.0 / 9.0, 1.0),
            layout: default_layout(),
        }
    }
}

/// D-pad bottom left, fire bottom right, skip button top right (landscape).
pub fn default_layout() -> Vec<ButtonPlacement> {
    let pad = Vec2::splat(0.14);
    let place = |id, x, y, size| ButtonPlacement {
        id,
        position: Vec2::new(x, y),
        size,
    };
    vec![
        place(ButtonId::Left, 0.10, 0.78, pad),
        place(ButtonId::Right, 0.36, 0.78, pad),
        place(ButtonId::Up, 0.23, 0.62, pad),
        place(ButtonId::Down, 0.23, 0.94, pad),
        place(ButtonId::Fire, 1.60, 0.80, Vec2::splat(0.22)),
        place(ButtonId::SkipLevel, 1.70, 0.10, Vec2::splat(0.12)),
    ]
}
