/// An RGBA8 image, row-major, no padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RgbaFrame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Change dimensions; contents are cleared when the size changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height * 4];
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Nearest-neighbour copy of `src` stretched over the whole frame.
    pub fn blit_from(&mut self, src: &RgbaFrame) {
        if src.width == 0 || src.height == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        if src.width == self.width && src.height == self.height {
            self.pixels.copy_from_slice(&src.pixels);
            return;
        }
        for y in 0..self.height {
            let sy = y * src.height / self.height;
            for x in 0..self.width {
                let sx = x * src.width / self.width;
                let s = (sy * src.width + sx) * 4;
                let d = (y * self.width + x) * 4;
                self.pixels[d..d + 4].copy_from_slice(&src.pixels[s..s + 4]);
            }
        }
    }
}
