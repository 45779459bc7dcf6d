//! The framebuffer the emulator thread renders into and the UI thread reads.
//!
//! The only way in is [`SharedFramebuffer::lock`], which hands out a scoped
//! guard. Callers hold the guard across a copy or conversion and drop it
//! before doing anything else, so the producer thread is never blocked by
//! state-machine work or rendering.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{FrameError, ShellError};
use crate::frame::FrameView;

/// Layout of the engine's backing pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasGeometry {
    /// Backing buffer width in pixels.
    pub width: usize,
    /// Backing buffer height in pixels.
    pub height: usize,
    /// Bytes per backing row; may exceed `width * bytes_per_pixel`.
    pub pitch: usize,
    /// 3 for BGR, 4 for BGRA.
    pub bytes_per_pixel: usize,
    /// Width of the displayed sub-rectangle (top-left anchored).
    pub visible_width: usize,
    /// Height of the displayed sub-rectangle.
    pub visible_height: usize,
}

impl CanvasGeometry {
    /// Geometry with no padding where the whole buffer is visible.
    pub fn packed(width: usize, height: usize, bytes_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            pitch: width * bytes_per_pixel,
            bytes_per_pixel,
            visible_width: width,
            visible_height: height,
        }
    }

    /// Total bytes of the backing buffer.
    pub fn buffer_len(&self) -> usize {
        self.pitch * self.height
    }

    pub fn visible_pixels(&self) -> usize {
        self.visible_width * self.visible_height
    }
}

/// Backing store plus the flags the engine maintains alongside it.
#[derive(Debug, Default)]
pub struct Canvas {
    geometry: CanvasGeometry,
    pixels: Vec<u8>,
    dirty: bool,
    inited: bool,
}

impl Canvas {
    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    pub fn is_inited(&self) -> bool {
        self.inited
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for the producer. Marks the frame dirty.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.dirty = true;
        &mut self.pixels
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Borrow the visible region for conversion.
    pub fn view(&self) -> Result<FrameView<'_>, FrameError> {
        let g = &self.geometry;
        if g.visible_width > g.width || g.visible_height > g.height {
            return Err(FrameError::RegionOutOfBounds {
                visible: (g.visible_width, g.visible_height),
                canvas: (g.width, g.height),
            });
        }
        FrameView::new(
            &self.pixels,
            g.pitch,
            g.visible_width,
            g.visible_height,
            g.bytes_per_pixel,
        )
    }

    /// Zero every visible pixel. Padding bytes are left untouched.
    pub fn clear_visible(&mut self) {
        let g = self.geometry;
        let row_bytes = g.visible_width * g.bytes_per_pixel;
        for y in 0..g.visible_height {
            let start = y * g.pitch;
            if let Some(row) = self.pixels.get_mut(start..start + row_bytes) {
                row.fill(0);
            }
        }
        self.dirty = true;
    }
}

/// Scoped, exclusive access to the [`Canvas`]. Dropping it releases the lock.
pub struct FramebufferGuard<'a>(MutexGuard<'a, Canvas>);

impl Deref for FramebufferGuard<'_> {
    type Target = Canvas;
    fn deref(&self) -> &Canvas {
        &self.0
    }
}

impl DerefMut for FramebufferGuard<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        &mut self.0
    }
}

/// Cloneable handle to the framebuffer shared between engine and UI thread.
#[derive(Clone, Default)]
pub struct SharedFramebuffer {
    inner: Arc<Mutex<Canvas>>,
}

impl SharedFramebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the framebuffer lock.
    pub fn lock(&self) -> Result<FramebufferGuard<'_>, ShellError> {
        self.inner
            .lock()
            .map(FramebufferGuard)
            .map_err(|_| ShellError::LockPoisoned("framebuffer"))
    }

    /// Called by the producer once the engine knows its video mode.
    /// Reallocates the backing buffer (zeroed) and marks the canvas ready.
    pub fn init(&self, geometry: CanvasGeometry) -> Result<(), ShellError> {
        let mut canvas = self.lock()?;
        canvas.geometry = geometry;
        canvas.pixels = vec![0; geometry.buffer_len()];
        canvas.dirty = false;
        canvas.inited = true;
        log::debug!(
            "canvas {}x{} (visible {}x{}), pitch {}, {} bytes/pixel",
            geometry.width,
            geometry.height,
            geometry.visible_width,
            geometry.visible_height,
            geometry.pitch,
            geometry.bytes_per_pixel
        );
        Ok(())
    }

    /// Producer helper: copy a whole backing buffer in and mark it dirty.
    /// Extra source bytes are ignored; a short source fills a prefix.
    pub fn publish(&self, src: &[u8]) -> Result<(), ShellError> {
        let mut canvas = self.lock()?;
        let dst = canvas.pixels_mut();
        let len = src.len().min(dst.len());
        dst[..len].copy_from_slice(&src[..len]);
        Ok(())
    }
}
