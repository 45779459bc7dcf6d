//! The in-game scene: emulated screen, boot automation and touch overlay.

use crate::boot::{BootSequencer, BootState};
use crate::config::{BootConfig, ShellConfig};
use crate::emulator::EmulatorContext;
use crate::error::ShellError;
use crate::frame::{self, FrameSample};
use crate::geometry::Vec2;
use crate::input::{ButtonInputRouter, ButtonSet, FingerId, OverlayButton, ResetGesture};

use super::{RgbaFrame, Scene};

pub struct GameScene {
    ctx: EmulatorContext,
    boot_config: BootConfig,
    sequencer: BootSequencer,
    router: ButtonInputRouter,
    reset: ResetGesture,
    /// Current local size the button layout is expressed in.
    layout_size: Vec2,
    /// Seconds of unpaused scene time.
    clock: f64,
    screen: RgbaFrame,
    /// Visible pixel count the sequencer thresholds were resolved for.
    thresholds_for: Option<usize>,
    paused: bool,
}

impl GameScene {
    pub fn new(ctx: EmulatorContext, config: &ShellConfig) -> Self {
        Self {
            ctx,
            boot_config: config.boot.clone(),
            sequencer: BootSequencer::new(&config.boot),
            router: ButtonInputRouter::new(&config.input),
            reset: ResetGesture::new(config.input.reset_button, config.input.reset_hold_secs),
            layout_size: config.input.layout_size,
            clock: 0.0,
            screen: RgbaFrame::default(),
            thresholds_for: None,
            paused: false,
        }
    }

    pub fn boot_state(&self) -> BootState {
        self.sequencer.state()
    }

    pub fn pressed_buttons(&self) -> ButtonSet {
        self.router.pressed()
    }

    pub fn buttons(&self) -> &[OverlayButton] {
        self.router.buttons()
    }

    pub fn router(&self) -> &ButtonInputRouter {
        &self.router
    }

    pub fn reset_gesture(&self) -> &ResetGesture {
        &self.reset
    }

    /// The last converted emulator picture.
    pub fn screen(&self) -> &RgbaFrame {
        &self.screen
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Power-cycle the machine and restart the boot script from the blue
    /// screen. The persisted snapshot is dropped so the full script runs.
    pub fn hard_reset(&mut self) -> Result<(), ShellError> {
        log::info!("hard reset requested in {:?}", self.sequencer.state());
        self.ctx.framebuffer.lock()?.clear_visible();
        self.screen.clear();
        self.router.clear();
        self.reset.cancel();
        self.sequencer.rearm();

        let emu = self.ctx.emulator.as_mut();
        emu.clear_keyboard();
        emu.hard_reset();
        emu.remove_snapshot();
        Ok(())
    }

    /// Convert the framebuffer if the engine produced a new frame. Returns
    /// the colour sums while booting; `None` when nothing changed or the
    /// game is running.
    fn refresh_frame(&mut self) -> Result<Option<FrameSample>, ShellError> {
        let wants_stats = self.sequencer.state().wants_statistics();

        let mut canvas = self.ctx.framebuffer.lock()?;
        if !canvas.is_inited() || !canvas.take_dirty() {
            return Ok(None);
        }
        let view = canvas.view()?;
        self.screen.resize(view.width(), view.height());
        let sample = if wants_stats {
            Some(frame::convert_with_stats(&view, self.screen.pixels_mut())?)
        } else {
            frame::convert(&view, self.screen.pixels_mut())?;
            None
        };
        let visible = canvas.geometry().visible_pixels();
        drop(canvas);

        if self.thresholds_for != Some(visible) {
            let t = self.boot_config.thresholds_for(visible as u64);
            log::debug!("thresholds for {visible} visible pixels: high={} mid={}", t.high, t.mid);
            self.sequencer.set_thresholds(t);
            self.thresholds_for = Some(visible);
        }
        Ok(sample)
    }

    fn over_reset_button(&self, pos: Vec2) -> bool {
        self.router
            .hitbox(self.reset.button())
            .is_some_and(|r| r.contains(pos))
    }
}

impl Scene for GameScene {
    fn init(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width, height);
        self.router.relayout(self.layout_size, size);
        self.layout_size = size;
        self.clock = 0.0;
        self.paused = false;
    }

    fn shutdown(&mut self) {
        let emu = self.ctx.emulator.as_mut();
        self.router.release_all(emu);
        self.reset.cancel();
        emu.clear_keyboard();
    }

    fn pause(&mut self) {
        self.router.release_all(self.ctx.emulator.as_mut());
        self.reset.cancel();
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn resize(&mut self, old: Vec2, new: Vec2) {
        self.router.relayout(old, new);
        self.layout_size = new;
    }

    fn update(&mut self, elapsed: f32) -> Result<(), ShellError> {
        if self.paused {
            return Ok(());
        }
        self.clock += elapsed as f64;

        if self.reset.poll(self.clock) {
            self.hard_reset()?;
        }
        if self.sequencer.advance_clock(elapsed) {
            self.hard_reset()?;
        }

        let sample = self.refresh_frame()?;
        if !self.sequencer.is_booted() && (sample.is_some() || self.sequencer.needs_tick()) {
            self.sequencer.step(self.ctx.emulator.as_mut(), sample);
        }
        Ok(())
    }

    fn render(&self, target: &mut RgbaFrame) {
        target.blit_from(&self.screen);
    }

    fn touch_down(&mut self, finger: FingerId, pos: Vec2) {
        let inside = self.over_reset_button(pos);
        self.reset.touch_down(finger, inside, self.clock);
        if self.sequencer.is_booted() {
            self.router.touch_down(self.ctx.emulator.as_mut(), finger, pos);
        }
    }

    fn touch_up(&mut self, finger: FingerId, pos: Vec2) {
        self.reset.touch_up(finger);
        if self.sequencer.is_booted() {
            self.router.touch_up(self.ctx.emulator.as_mut(), finger, pos);
        }
    }

    fn touch_move(&mut self, finger: FingerId, pos: Vec2) {
        let inside = self.over_reset_button(pos);
        self.reset.touch_move(finger, inside);
        if self.sequencer.is_booted() {
            self.router.touch_move(self.ctx.emulator.as_mut(), finger, pos);
        }
    }
}
