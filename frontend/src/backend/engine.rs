//! Binding to the native C64 engine library.
//!
//! The engine runs its own main loop (`main_program`) on a dedicated thread
//! and reports video and audio through the two callbacks registered with
//! `shell_attach`. Everything else is a plain synchronous call.

use std::ffi::{CString, c_char, c_int, c_void};
use std::path::Path;
use std::sync::OnceLock;

use mayhem_core::config::BootConfig;
use mayhem_core::emulator::{
    CanvasGeometry, Emulator, EmulatorContext, KeyCode, PcmQueue, SharedFramebuffer,
};

use super::{BackendEntry, BackendError};

#[repr(C)]
struct EngineCanvas {
    width: c_int,
    height: c_int,
    pitch: c_int,
    bytes_per_pixel: c_int,
    visible_width: c_int,
    visible_height: c_int,
}

type FrameCallback = extern "C" fn(*const EngineCanvas, *const u8, usize);
type AudioCallback = extern "C" fn(*const u8, usize);

#[link(name = "mayhem_engine")]
unsafe extern "C" {
    fn main_program(argc: c_int, argv: *mut *mut c_char) -> c_int;
    fn shell_attach(on_frame: FrameCallback, on_audio: AudioCallback);
    fn shell_key_press(code: c_int);
    fn shell_key_release(code: c_int);
    fn shell_keyboard_clear();
    fn shell_hard_reset();
    fn shell_set_warp(enabled: c_int);
    fn shell_autostart(path: *const c_char) -> c_int;
    fn shell_snapshot_load() -> c_int;
    fn shell_snapshot_save();
    fn shell_snapshot_remove();
}

struct Shared {
    framebuffer: SharedFramebuffer,
    pcm: PcmQueue,
}

static SHARED: OnceLock<Shared> = OnceLock::new();

extern "C" fn on_frame(canvas: *const EngineCanvas, pixels: *const u8, len: usize) {
    let Some(shared) = SHARED.get() else { return };
    if canvas.is_null() || pixels.is_null() {
        return;
    }
    // SAFETY: the engine passes a valid canvas description and `len` readable
    // bytes for the duration of the call.
    let (c, src) = unsafe { (&*canvas, std::slice::from_raw_parts(pixels, len)) };
    let geometry = CanvasGeometry {
        width: c.width.max(0) as usize,
        height: c.height.max(0) as usize,
        pitch: c.pitch.max(0) as usize,
        bytes_per_pixel: c.bytes_per_pixel.max(0) as usize,
        visible_width: c.visible_width.max(0) as usize,
        visible_height: c.visible_height.max(0) as usize,
    };

    let changed = match shared.framebuffer.lock() {
        Ok(canvas) => *canvas.geometry() != geometry || !canvas.is_inited(),
        Err(e) => {
            log::error!("engine frame dropped: {e}");
            return;
        }
    };
    if changed && let Err(e) = shared.framebuffer.init(geometry) {
        log::error!("engine canvas init failed: {e}");
        return;
    }
    if let Err(e) = shared.framebuffer.publish(src) {
        log::error!("engine frame dropped: {e}");
    }
}

extern "C" fn on_audio(samples: *const u8, len: usize) {
    let Some(shared) = SHARED.get() else { return };
    if samples.is_null() {
        return;
    }
    // SAFETY: `len` bytes of PCM are readable for the duration of the call.
    let chunk = unsafe { std::slice::from_raw_parts(samples, len) };
    if let Err(e) = shared.pcm.push(chunk) {
        log::error!("engine audio dropped: {e}");
    }
}

pub struct NativeEngine;

impl Emulator for NativeEngine {
    fn press_key(&mut self, code: KeyCode) {
        unsafe { shell_key_press(code) }
    }

    fn release_key(&mut self, code: KeyCode) {
        unsafe { shell_key_release(code) }
    }

    fn clear_keyboard(&mut self) {
        unsafe { shell_keyboard_clear() }
    }

    fn hard_reset(&mut self) {
        unsafe { shell_hard_reset() }
    }

    fn set_warp_mode(&mut self, enabled: bool) {
        unsafe { shell_set_warp(c_int::from(enabled)) }
    }

    fn autostart_disk(&mut self, path: &Path) -> i32 {
        let Ok(path) = CString::new(path.to_string_lossy().into_owned()) else {
            log::warn!("disk path contains a NUL byte");
            return -1;
        };
        unsafe { shell_autostart(path.as_ptr()) }
    }

    fn load_snapshot(&mut self) -> bool {
        unsafe { shell_snapshot_load() != 0 }
    }

    fn save_snapshot(&mut self) {
        unsafe { shell_snapshot_save() }
    }

    fn remove_snapshot(&mut self) {
        unsafe { shell_snapshot_remove() }
    }
}

fn create(config: &BootConfig) -> Result<EmulatorContext, BackendError> {
    let disk = config
        .disk
        .as_deref()
        .ok_or_else(|| BackendError::Start("the engine needs a disk image (--disk)".into()))?;

    let framebuffer = SharedFramebuffer::new();
    let pcm = PcmQueue::new();
    SHARED
        .set(Shared {
            framebuffer: framebuffer.clone(),
            pcm: pcm.clone(),
        })
        .map_err(|_| BackendError::Start("engine already running".into()))?;

    let exe = CString::new("mayhem").map_err(|e| BackendError::Start(e.to_string()))?;
    let disk = CString::new(disk.to_string_lossy().into_owned())
        .map_err(|e| BackendError::Start(e.to_string()))?;

    unsafe { shell_attach(on_frame, on_audio) };

    std::thread::Builder::new()
        .name("engine".into())
        .spawn(move || {
            let mut argv = [exe.into_raw(), disk.into_raw()];
            let status = unsafe { main_program(argv.len() as c_int, argv.as_mut_ptr()) };
            // SAFETY: both pointers came from `CString::into_raw` above.
            for arg in argv {
                drop(unsafe { CString::from_raw(arg) });
            }
            log::info!("engine exited with status {status}");
        })
        .map_err(|e| BackendError::Start(e.to_string()))?;

    Ok(EmulatorContext::new(Box::new(NativeEngine), framebuffer, pcm))
}

inventory::submit! {
    BackendEntry::new("engine", "native C64 engine library", create)
}
