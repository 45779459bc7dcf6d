//! Scripted boot of the emulated machine.
//!
//! The engine gives no "ready" signal, so the sequencer infers the boot phase
//! from the colour sums of each new frame and types the keystrokes that get
//! the machine from its power-on screen to a running game. A stuck screen
//! simply leaves it waiting; the optional watchdog turns that into a reset.

pub mod state;

use std::path::PathBuf;

pub use state::BootState;

use crate::config::{BootConfig, BootKeys, Thresholds};
use crate::emulator::{Emulator, KeyCode};
use crate::frame::FrameSample;

pub struct BootSequencer {
    state: BootState,
    /// Ticks held in a release state, or Space taps completed.
    counter: u32,
    last_sample: FrameSample,
    thresholds: Thresholds,
    keys: BootKeys,
    hold_ticks: u32,
    space_repeats: u32,
    warp_during_boot: bool,
    snapshot_fast_path: bool,
    save_snapshot_on_boot: bool,
    disk: Option<PathBuf>,

    warp_pending: bool,
    autostart_pending: bool,

    boot_elapsed: f32,
    watchdog_secs: Option<f32>,
    stall_warn_secs: f32,
    stall_warned: bool,
}

impl BootSequencer {
    /// Sequencer for a machine that was just started with its disk attached.
    /// No autostart is issued until the first [`rearm`](Self::rearm).
    pub fn new(config: &BootConfig) -> Self {
        Self {
            state: BootState::Blue,
            counter: 0,
            last_sample: FrameSample::zero(),
            thresholds: config.base_thresholds(),
            keys: config.keys,
            hold_ticks: config.hold_ticks,
            space_repeats: config.space_repeats.max(1),
            warp_during_boot: config.warp_during_boot,
            snapshot_fast_path: config.snapshot_fast_path,
            save_snapshot_on_boot: config.save_snapshot_on_boot,
            disk: config.disk.clone(),
            warp_pending: config.warp_during_boot,
            autostart_pending: false,
            boot_elapsed: 0.0,
            watchdog_secs: config.watchdog_secs,
            stall_warn_secs: config.stall_warn_secs,
            stall_warned: false,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_booted(&self) -> bool {
        self.state.is_game()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    /// Seconds spent booting since the last (re)arm.
    pub fn boot_elapsed(&self) -> f32 {
        self.boot_elapsed
    }

    /// Whether [`step`](Self::step) must run this tick even without a new frame.
    pub fn needs_tick(&self) -> bool {
        self.state.is_dirty_state()
            || (self.state == BootState::Blue && (self.warp_pending || self.autostart_pending))
    }

    /// Restart from the power-on screen after a hard reset. The next tick
    /// re-enables warp and autostarts the disk.
    pub fn rearm(&mut self) {
        self.state = BootState::Blue;
        self.counter = 0;
        self.last_sample = FrameSample::zero();
        self.warp_pending = self.warp_during_boot;
        self.autostart_pending = self.disk.is_some();
        self.boot_elapsed = 0.0;
        self.stall_warned = false;
        log::info!("boot sequence re-armed");
    }

    /// Advance the boot clock. Returns `true` when the watchdog expired; the
    /// caller then resets the machine and calls [`rearm`](Self::rearm).
    pub fn advance_clock(&mut self, elapsed: f32) -> bool {
        if self.is_booted() {
            return false;
        }
        self.boot_elapsed += elapsed;

        if !self.stall_warned && self.boot_elapsed > self.stall_warn_secs {
            self.stall_warned = true;
            log::warn!(
                "boot still in {:?} after {:.0}s (last sums r={} g={} b={})",
                self.state,
                self.boot_elapsed,
                self.last_sample.red_sum,
                self.last_sample.green_sum,
                self.last_sample.blue_sum
            );
        }

        match self.watchdog_secs {
            Some(limit) if self.boot_elapsed > limit => {
                log::warn!("boot watchdog expired in {:?}", self.state);
                true
            }
            _ => false,
        }
    }

    /// Run one transition check. `sample` is the statistics of a new frame,
    /// or `None` when the frame did not change (the previous sample is
    /// reused by dirty states).
    pub fn step(&mut self, emu: &mut dyn Emulator, sample: Option<FrameSample>) -> BootState {
        if let Some(s) = sample {
            self.last_sample = s;
        }

        if self.state == BootState::Blue {
            self.power_on_actions(emu);
        }

        let next = self.transition(emu);
        if next != self.state {
            if next.is_game() {
                log::info!("boot complete ({:?} -> Game after {:.1}s)", self.state, self.boot_elapsed);
            } else {
                log::debug!("boot {:?} -> {:?}", self.state, next);
            }
            self.state = next;
        }
        self.state
    }

    fn power_on_actions(&mut self, emu: &mut dyn Emulator) {
        if std::mem::take(&mut self.warp_pending) {
            emu.set_warp_mode(true);
        }
        if std::mem::take(&mut self.autostart_pending)
            && let Some(disk) = &self.disk
        {
            let status = emu.autostart_disk(disk);
            if status != 0 {
                log::warn!("autostart of {} returned {status}", disk.display());
            }
        }
    }

    fn transition(&mut self, emu: &mut dyn Emulator) -> BootState {
        use BootState::*;

        let s = self.last_sample;
        let t = self.thresholds;
        let keys = self.keys;

        match self.state {
            Blue => {
                if s.all_above(t.high) {
                    AfterBlue
                } else {
                    Blue
                }
            }
            AfterBlue => {
                if self.snapshot_fast_path && emu.load_snapshot() {
                    log::info!("snapshot restored, skipping boot script");
                    emu.set_warp_mode(false);
                    self.last_sample = FrameSample::zero();
                    Game
                } else if s.all_below(t.high) {
                    emu.set_warp_mode(false);
                    emu.clear_keyboard();
                    DemoPressSpace
                } else {
                    AfterBlue
                }
            }
            DemoPressSpace => {
                if s.all_above(t.mid) {
                    emu.press_key(keys.space);
                    DemoReleaseSpace
                } else {
                    DemoPressSpace
                }
            }
            DemoReleaseSpace => {
                emu.release_key(keys.space);
                AfterDemo
            }
            AfterDemo => {
                if s.is_black() {
                    emu.release_key(keys.space);
                    BeforeHack
                } else {
                    emu.press_key(keys.space);
                    AfterDemo
                }
            }
            BeforeHack => {
                if s.all_above(t.high) {
                    emu.clear_keyboard();
                    self.counter = 0;
                    HackPressF1
                } else {
                    BeforeHack
                }
            }
            HackPressF1 => {
                if s.all_below(t.high) {
                    self.press_and_hold(emu, keys.f1, HackReleaseF1)
                } else {
                    HackPressF1
                }
            }
            HackReleaseF1 => self.release_after_hold(emu, keys.f1, HackReleaseF1, HackPressF3),
            HackPressF3 => self.press_and_hold(emu, keys.f3, HackReleaseF3),
            HackReleaseF3 => self.release_after_hold(emu, keys.f3, HackReleaseF3, HackPressF5),
            HackPressF5 => self.press_and_hold(emu, keys.f5, HackReleaseF5),
            HackReleaseF5 => self.release_after_hold(emu, keys.f5, HackReleaseF5, HackPressSpace),
            HackPressSpace => {
                emu.press_key(keys.space);
                HackReleaseSpace
            }
            HackReleaseSpace => {
                emu.release_key(keys.space);
                self.counter += 1;
                if self.counter < self.space_repeats {
                    HackPressSpace
                } else {
                    AfterHack
                }
            }
            AfterHack => {
                emu.clear_keyboard();
                self.last_sample = FrameSample::zero();
                if self.save_snapshot_on_boot {
                    emu.save_snapshot();
                }
                Game
            }
            Game => Game,
        }
    }

    fn press_and_hold(&mut self, emu: &mut dyn Emulator, key: KeyCode, next: BootState) -> BootState {
        emu.press_key(key);
        self.counter = 0;
        next
    }

    /// Release `key` once it has been held for `hold_ticks` ticks. The
    /// counter restarts so the next counting state begins at zero.
    fn release_after_hold(
        &mut self,
        emu: &mut dyn Emulator,
        key: KeyCode,
        current: BootState,
        next: BootState,
    ) -> BootState {
        if self.counter >= self.hold_ticks {
            emu.release_key(key);
            self.counter = 0;
            next
        } else {
            self.counter += 1;
            current
        }
    }
}
