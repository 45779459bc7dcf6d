//! Built-in stand-in for the emulator engine.
//!
//! [`SimMachine`] models only what the shell can observe: the colour of each
//! boot screen and which keys move it on. [`SimEmulator`] runs it on a worker
//! thread at [`FRAME_RATE`] and paints every frame into the shared
//! framebuffer, the way the real engine does.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use mayhem_core::config::{BootConfig, BootKeys};
use mayhem_core::emulator::{
    CanvasGeometry, Emulator, EmulatorContext, KeyCode, PcmQueue, SharedFramebuffer,
};
use mayhem_core::error::ShellError;

use super::{BackendEntry, BackendError};

pub const FRAME_RATE: u32 = 50;
pub const SAMPLE_RATE: u32 = 44_100;
/// Emulated frames per real frame while warp is on.
const WARP_FACTOR: u32 = 4;
const TONE_HZ: u32 = 440;
const TONE_AMPLITUDE: i16 = 2_000;

/// PAL screen with border, padded rows like the engine's canvas.
pub fn geometry() -> CanvasGeometry {
    CanvasGeometry {
        width: 400,
        height: 284,
        pitch: 400 * 4 + 64,
        bytes_per_pixel: 4,
        visible_width: 384,
        visible_height: 272,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PowerOn,
    Loading,
    Demo,
    Blank,
    Title,
    Menu,
    Playing,
}

impl Phase {
    /// RGB of the whole visible area.
    fn colour(self) -> [u8; 3] {
        match self {
            Phase::PowerOn => [160, 160, 255],
            Phase::Loading => [20, 20, 20],
            Phase::Demo => [70, 70, 70],
            Phase::Blank => [0, 0, 0],
            Phase::Title => [200, 200, 200],
            Phase::Menu => [40, 40, 40],
            Phase::Playing => [30, 90, 200],
        }
    }

    /// Frames after which the phase moves on by itself.
    fn duration(self) -> Option<u32> {
        match self {
            Phase::PowerOn => Some(75),
            Phase::Loading => Some(150),
            Phase::Blank => Some(25),
            Phase::Title => Some(25),
            Phase::Demo | Phase::Menu | Phase::Playing => None,
        }
    }

    fn next(self) -> Phase {
        match self {
            Phase::PowerOn => Phase::Loading,
            Phase::Loading => Phase::Demo,
            Phase::Blank => Phase::Title,
            Phase::Title => Phase::Menu,
            other => other,
        }
    }
}

pub struct SimMachine {
    phase: Phase,
    frames_in_phase: u32,
    tick: u64,
    warp: bool,
    keys: BootKeys,
    held: HashSet<KeyCode>,
    /// Progress through the F1, F3, F5 fast-boot code on the menu.
    code_progress: usize,
    space_taps: u32,
    snapshot: Option<Phase>,
    tone_pos: u32,
}

impl SimMachine {
    pub fn new(keys: BootKeys) -> Self {
        Self {
            phase: Phase::PowerOn,
            frames_in_phase: 0,
            tick: 0,
            warp: false,
            keys,
            held: HashSet::new(),
            code_progress: 0,
            space_taps: 0,
            snapshot: None,
            tone_pos: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_warp(&self) -> bool {
        self.warp
    }

    fn enter(&mut self, phase: Phase) {
        if phase != self.phase {
            log::debug!("sim {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        self.frames_in_phase = 0;
    }

    /// Run one real frame worth of emulation.
    pub fn advance(&mut self) {
        let steps = if self.warp { WARP_FACTOR } else { 1 };
        for _ in 0..steps {
            self.tick += 1;
            self.frames_in_phase += 1;
            if let Some(limit) = self.phase.duration()
                && self.frames_in_phase >= limit
            {
                self.enter(self.phase.next());
            }
        }
    }

    fn key_down(&mut self, code: KeyCode) {
        let keys = self.keys;
        match self.phase {
            Phase::Demo if code == keys.space => self.enter(Phase::Blank),
            Phase::Menu if self.code_progress < 3 => {
                let code_keys = [keys.f1, keys.f3, keys.f5];
                self.code_progress = if code == code_keys[self.code_progress] {
                    self.code_progress + 1
                } else if code == keys.f1 {
                    1
                } else {
                    0
                };
            }
            Phase::Menu if code == keys.space => {
                self.space_taps += 1;
                if self.space_taps >= 3 {
                    self.enter(Phase::Playing);
                }
            }
            _ => {}
        }
    }

    fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        if self.phase != Phase::Playing {
            return self.phase.colour();
        }
        let band = (x + y + self.tick as usize * 2) / 16 % 2;
        let [r, g, b] = if band == 0 {
            Phase::Playing.colour()
        } else {
            [200, 60, 30]
        };
        if self.held.is_empty() {
            [r, g, b]
        } else {
            [r.saturating_add(40), g.saturating_add(40), b.saturating_add(40)]
        }
    }

    /// Paint the visible area as BGR(A) rows. Padding is left alone.
    pub fn paint(&self, pixels: &mut [u8], geometry: &CanvasGeometry) {
        let bpp = geometry.bytes_per_pixel;
        let row_bytes = geometry.visible_width * bpp;
        for y in 0..geometry.visible_height {
            let start = y * geometry.pitch;
            let Some(row) = pixels.get_mut(start..start + row_bytes) else {
                return;
            };
            for (x, px) in row.chunks_exact_mut(bpp).enumerate() {
                let [r, g, b] = self.pixel(x, y);
                px[0] = b;
                px[1] = g;
                px[2] = r;
                if bpp == 4 {
                    px[3] = 0xFF;
                }
            }
        }
    }

    /// One frame of 16-bit little-endian PCM: a square wave while a key is
    /// held in game, otherwise nothing.
    pub fn audio(&mut self, samples: usize) -> Option<Vec<u8>> {
        if self.phase != Phase::Playing || self.held.is_empty() {
            return None;
        }
        let half_period = SAMPLE_RATE / TONE_HZ / 2;
        let mut out = Vec::with_capacity(samples * 2);
        for _ in 0..samples {
            let high = (self.tone_pos / half_period) % 2 == 0;
            let value = if high { TONE_AMPLITUDE } else { -TONE_AMPLITUDE };
            out.extend_from_slice(&value.to_le_bytes());
            self.tone_pos = self.tone_pos.wrapping_add(1);
        }
        Some(out)
    }
}

impl Emulator for SimMachine {
    fn press_key(&mut self, code: KeyCode) {
        if self.held.insert(code) {
            self.key_down(code);
        }
    }

    fn release_key(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    fn clear_keyboard(&mut self) {
        self.held.clear();
    }

    fn hard_reset(&mut self) {
        self.held.clear();
        self.code_progress = 0;
        self.space_taps = 0;
        self.warp = false;
        self.enter(Phase::PowerOn);
    }

    fn set_warp_mode(&mut self, enabled: bool) {
        self.warp = enabled;
    }

    fn autostart_disk(&mut self, path: &Path) -> i32 {
        log::info!("sim: autostart {}", path.display());
        if self.phase != Phase::PowerOn {
            self.enter(Phase::PowerOn);
        }
        0
    }

    fn load_snapshot(&mut self) -> bool {
        match self.snapshot {
            Some(phase) => {
                self.enter(phase);
                true
            }
            None => false,
        }
    }

    fn save_snapshot(&mut self) {
        self.snapshot = Some(self.phase);
    }

    fn remove_snapshot(&mut self) {
        self.snapshot = None;
    }
}

/// [`SimMachine`] on its own thread. Dropping it stops the thread.
pub struct SimEmulator {
    machine: Arc<Mutex<SimMachine>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SimEmulator {
    pub fn start(
        keys: BootKeys,
        framebuffer: SharedFramebuffer,
        pcm: PcmQueue,
    ) -> Result<Self, BackendError> {
        framebuffer.init(geometry())?;
        let machine = Arc::new(Mutex::new(SimMachine::new(keys)));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = std::thread::Builder::new()
            .name("sim-engine".into())
            .spawn({
                let machine = Arc::clone(&machine);
                let stop = Arc::clone(&stop);
                move || run(&machine, &framebuffer, &pcm, &stop)
            })
            .map_err(|e| BackendError::Start(e.to_string()))?;

        Ok(Self {
            machine,
            stop,
            worker: Some(worker),
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut SimMachine) -> R) -> Option<R> {
        match self.machine.lock() {
            Ok(mut machine) => Some(f(&mut machine)),
            Err(_) => {
                log::error!("simulator state poisoned");
                None
            }
        }
    }
}

impl Drop for SimEmulator {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("simulator thread panicked");
        }
    }
}

impl Emulator for SimEmulator {
    fn press_key(&mut self, code: KeyCode) {
        self.with(|m| m.press_key(code));
    }

    fn release_key(&mut self, code: KeyCode) {
        self.with(|m| m.release_key(code));
    }

    fn clear_keyboard(&mut self) {
        self.with(|m| m.clear_keyboard());
    }

    fn hard_reset(&mut self) {
        self.with(|m| m.hard_reset());
    }

    fn set_warp_mode(&mut self, enabled: bool) {
        self.with(|m| m.set_warp_mode(enabled));
    }

    fn autostart_disk(&mut self, path: &Path) -> i32 {
        self.with(|m| m.autostart_disk(path)).unwrap_or(-1)
    }

    fn load_snapshot(&mut self) -> bool {
        self.with(|m| m.load_snapshot()).unwrap_or(false)
    }

    fn save_snapshot(&mut self) {
        self.with(|m| m.save_snapshot());
    }

    fn remove_snapshot(&mut self) {
        self.with(|m| m.remove_snapshot());
    }
}

fn run(
    machine: &Mutex<SimMachine>,
    framebuffer: &SharedFramebuffer,
    pcm: &PcmQueue,
    stop: &AtomicBool,
) {
    let frame = Duration::from_secs(1) / FRAME_RATE;
    let samples = (SAMPLE_RATE / FRAME_RATE) as usize;
    log::debug!("simulator thread started");

    while !stop.load(Ordering::Relaxed) {
        let started = Instant::now();
        if let Err(e) = emulate_frame(machine, framebuffer, pcm, samples) {
            log::error!("simulator stopped: {e}");
            break;
        }
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    log::debug!("simulator thread finished");
}

fn emulate_frame(
    machine: &Mutex<SimMachine>,
    framebuffer: &SharedFramebuffer,
    pcm: &PcmQueue,
    samples: usize,
) -> Result<(), ShellError> {
    let mut machine = machine
        .lock()
        .map_err(|_| ShellError::LockPoisoned("simulator"))?;
    machine.advance();

    let mut canvas = framebuffer.lock()?;
    let geometry = *canvas.geometry();
    machine.paint(canvas.pixels_mut(), &geometry);
    drop(canvas);

    if let Some(chunk) = machine.audio(samples) {
        pcm.push(&chunk)?;
    }
    Ok(())
}

fn create(config: &BootConfig) -> Result<EmulatorContext, BackendError> {
    let framebuffer = SharedFramebuffer::new();
    let pcm = PcmQueue::new();
    let sim = SimEmulator::start(config.keys, framebuffer.clone(), pcm.clone())?;
    Ok(EmulatorContext::new(Box::new(sim), framebuffer, pcm))
}

inventory::submit! {
    BackendEntry::new("sim", "built-in boot simulator (no real engine)", create)
}
