#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mayhem_core::emulator::{Emulator, KeyCode};

/// One call made against the emulator interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Press(KeyCode),
    Release(KeyCode),
    ClearKeyboard,
    HardReset,
    Warp(bool),
    Autostart(PathBuf),
    LoadSnapshot,
    SaveSnapshot,
    RemoveSnapshot,
}

/// Shared view of the calls a [`RecordingEmulator`] received, usable after
/// the emulator itself was boxed and moved into a scene.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<Call>>>,
    snapshot_available: Rc<Cell<bool>>,
}

impl CallLog {
    pub fn all(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Return and forget everything recorded so far.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Only key press/release calls.
    pub fn keys(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Press(_) | Call::Release(_)))
            .cloned()
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn set_snapshot_available(&self, available: bool) {
        self.snapshot_available.set(available);
    }
}

/// Emulator stand-in that records every call. `load_snapshot()` succeeds
/// only when the log says a snapshot is available.
pub struct RecordingEmulator {
    log: CallLog,
}

impl RecordingEmulator {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone() }, log)
    }

    fn record(&self, call: Call) {
        self.log.calls.borrow_mut().push(call);
    }
}

impl Emulator for RecordingEmulator {
    fn press_key(&mut self, code: KeyCode) {
        self.record(Call::Press(code));
    }

    fn release_key(&mut self, code: KeyCode) {
        self.record(Call::Release(code));
    }

    fn clear_keyboard(&mut self) {
        self.record(Call::ClearKeyboard);
    }

    fn hard_reset(&mut self) {
        self.record(Call::HardReset);
    }

    fn set_warp_mode(&mut self, enabled: bool) {
        self.record(Call::Warp(enabled));
    }

    fn autostart_disk(&mut self, path: &Path) -> i32 {
        self.record(Call::Autostart(path.to_path_buf()));
        0
    }

    fn load_snapshot(&mut self) -> bool {
        self.record(Call::LoadSnapshot);
        self.log.snapshot_available.get()
    }

    fn save_snapshot(&mut self) {
        self.record(Call::SaveSnapshot);
    }

    fn remove_snapshot(&mut self) {
        self.record(Call::RemoveSnapshot);
    }
}

// Default scan codes
pub const SPACE: KeyCode = 57;
pub const F1: KeyCode = 59;
pub const F3: KeyCode = 61;
pub const F5: KeyCode = 63;
pub const LEFT: KeyCode = 75;
pub const RIGHT: KeyCode = 77;
pub const UP: KeyCode = 72;
pub const DOWN: KeyCode = 80;
pub const FIRE: KeyCode = 100;
pub const SKIP: KeyCode = 29;
