pub mod framebuffer;
pub mod pcm;

use std::path::Path;

pub use framebuffer::{Canvas, CanvasGeometry, FramebufferGuard, SharedFramebuffer};
pub use pcm::PcmQueue;

/// Scan code understood by the emulated keyboard.
pub type KeyCode = i32;

/// Black-box interface of the embedded emulator engine.
///
/// The shell never looks inside the engine: it drives the emulated keyboard,
/// resets and speeds the machine up, and asks it to save or restore a
/// snapshot. Every call is synchronous. Only `load_snapshot()` reports
/// failure, and the boot sequencer treats that as "try again later".
pub trait Emulator {
    /// Latch a key as held on the emulated keyboard.
    fn press_key(&mut self, code: KeyCode);

    /// Release a previously pressed key.
    fn release_key(&mut self, code: KeyCode);

    /// Release every key on the emulated keyboard.
    fn clear_keyboard(&mut self);

    /// Power-cycle the emulated machine.
    fn hard_reset(&mut self);

    /// Run faster than real time while `enabled`.
    fn set_warp_mode(&mut self, enabled: bool);

    /// Attach a disk image and start its first program. Returns the engine's
    /// status code (0 on success).
    fn autostart_disk(&mut self, path: &Path) -> i32;

    /// Restore the persisted machine snapshot. `false` when there is none
    /// or it could not be applied.
    fn load_snapshot(&mut self) -> bool;

    /// Persist the current machine state.
    fn save_snapshot(&mut self);

    /// Delete the persisted snapshot so the next start boots from scratch.
    fn remove_snapshot(&mut self);
}

/// Everything the scene needs from the engine boundary: the call interface
/// plus the two resources the engine thread shares with the UI thread.
pub struct EmulatorContext {
    pub emulator: Box<dyn Emulator>,
    pub framebuffer: SharedFramebuffer,
    pub pcm: PcmQueue,
}

impl EmulatorContext {
    pub fn new(emulator: Box<dyn Emulator>, framebuffer: SharedFramebuffer, pcm: PcmQueue) -> Self {
        Self {
            emulator,
            framebuffer,
            pcm,
        }
    }
}
