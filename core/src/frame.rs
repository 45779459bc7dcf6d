//! Framebuffer conversion and per-frame colour statistics.
//!
//! The engine renders BGR or BGRA into a backing buffer whose rows may be
//! padded. Conversion trims that to the visible region, swizzles to RGBA for
//! display, and (during boot) sums each colour channel over every visible
//! pixel. The sums are the only signal the boot sequencer gets about what is
//! on the emulated screen.

use crate::error::FrameError;

/// Channel sums over the visible region of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSample {
    pub red_sum: u64,
    pub green_sum: u64,
    pub blue_sum: u64,
}

impl FrameSample {
    pub const fn new(red_sum: u64, green_sum: u64, blue_sum: u64) -> Self {
        Self {
            red_sum,
            green_sum,
            blue_sum,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Same sum on every channel.
    pub const fn uniform(sum: u64) -> Self {
        Self::new(sum, sum, sum)
    }

    /// Every channel strictly above `threshold`.
    pub fn all_above(&self, threshold: u64) -> bool {
        self.red_sum > threshold && self.green_sum > threshold && self.blue_sum > threshold
    }

    /// Every channel strictly below `threshold`.
    pub fn all_below(&self, threshold: u64) -> bool {
        self.red_sum < threshold && self.green_sum < threshold && self.blue_sum < threshold
    }

    pub fn is_black(&self) -> bool {
        self.red_sum == 0 && self.green_sum == 0 && self.blue_sum == 0
    }
}

/// Borrowed view of the visible region of a backing buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    src: &'a [u8],
    pitch: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
}

impl<'a> FrameView<'a> {
    /// Validate the geometry against the buffer. Any violation is a broken
    /// contract with the engine and comes back as a [`FrameError`].
    pub fn new(
        src: &'a [u8],
        pitch: usize,
        width: usize,
        height: usize,
        bytes_per_pixel: usize,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyRegion);
        }
        if src.is_empty() {
            return Err(FrameError::EmptyBuffer);
        }
        if bytes_per_pixel != 3 && bytes_per_pixel != 4 {
            return Err(FrameError::UnsupportedPixelSize(bytes_per_pixel));
        }
        let row_bytes = width * bytes_per_pixel;
        if pitch < row_bytes {
            return Err(FrameError::PitchTooSmall { pitch, row_bytes });
        }
        let needed = pitch * (height - 1) + row_bytes;
        if src.len() < needed {
            return Err(FrameError::SourceTooShort {
                needed,
                actual: src.len(),
            });
        }
        Ok(Self {
            src,
            pitch,
            width,
            height,
            bytes_per_pixel,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes needed for the RGBA copy.
    pub fn rgba_len(&self) -> usize {
        self.width * self.height * 4
    }

    fn rows(&self) -> impl Iterator<Item = &'a [u8]> {
        let src = self.src;
        let pitch = self.pitch;
        let row_bytes = self.width * self.bytes_per_pixel;
        (0..self.height).map(move |y| &src[y * pitch..y * pitch + row_bytes])
    }

    fn check_destination(&self, dst: &[u8]) -> Result<(), FrameError> {
        let needed = self.rgba_len();
        if dst.is_empty() {
            return Err(FrameError::EmptyBuffer);
        }
        if dst.len() < needed {
            return Err(FrameError::DestinationTooShort {
                needed,
                actual: dst.len(),
            });
        }
        Ok(())
    }
}

/// Copy and swizzle the visible region into `dst` as RGBA (alpha forced
/// opaque). Used once the game is running and statistics are not needed.
pub fn convert(view: &FrameView<'_>, dst: &mut [u8]) -> Result<(), FrameError> {
    view.check_destination(dst)?;
    let bpp = view.bytes_per_pixel;
    let mut out = dst.chunks_exact_mut(4);

    for row in view.rows() {
        for (px, o) in row.chunks_exact(bpp).zip(&mut out) {
            o[0] = px[2];
            o[1] = px[1];
            o[2] = px[0];
            o[3] = 0xFF;
        }
    }
    Ok(())
}

/// Like [`convert`], additionally summing each channel over the region.
pub fn convert_with_stats(view: &FrameView<'_>, dst: &mut [u8]) -> Result<FrameSample, FrameError> {
    view.check_destination(dst)?;
    let bpp = view.bytes_per_pixel;
    let mut out = dst.chunks_exact_mut(4);
    let mut sample = FrameSample::zero();

    for row in view.rows() {
        for (px, o) in row.chunks_exact(bpp).zip(&mut out) {
            let (b, g, r) = (px[0], px[1], px[2]);
            o[0] = r;
            o[1] = g;
            o[2] = b;
            o[3] = 0xFF;
            sample.red_sum += r as u64;
            sample.green_sum += g as u64;
            sample.blue_sum += b as u64;
        }
    }
    Ok(sample)
}

/// Channel sums without producing a copy.
pub fn sample(view: &FrameView<'_>) -> FrameSample {
    let bpp = view.bytes_per_pixel;
    let mut sample = FrameSample::zero();
    for row in view.rows() {
        for px in row.chunks_exact(bpp) {
            sample.blue_sum += px[0] as u64;
            sample.green_sum += px[1] as u64;
            sample.red_sum += px[2] as u64;
        }
    }
    sample
}
