//! Coordinate systems of the host.
//!
//! Three systems, all with the origin in the top-left corner:
//! - screen: physical pixels of the display;
//! - reference: pixel size of the screen the layout was designed on;
//! - local: what scenes work in. The short side is 1.0 and the long side is
//!   the aspect ratio, so portrait is `(1, aspect)` and landscape `(aspect, 1)`.

use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    width: f32,
    height: f32,
    screen_width: u32,
    screen_height: u32,
    ref_width: u32,
    ref_height: u32,
}

impl Viewport {
    pub fn new(screen_width: u32, screen_height: u32, ref_width: u32, ref_height: u32) -> Self {
        let mut vp = Self {
            ref_width,
            ref_height,
            ..Self::default()
        };
        vp.init_projection(screen_width, screen_height);
        vp
    }

    /// Adopt a new screen size, rotating the reference size to match the new
    /// orientation. Returns the previous local size.
    pub fn resize(&mut self, screen_width: u32, screen_height: u32) -> Vec2 {
        let old = self.local_size();
        let (lo, hi) = (
            self.ref_width.min(self.ref_height),
            self.ref_width.max(self.ref_height),
        );
        if screen_width > screen_height {
            self.ref_width = hi;
            self.ref_height = lo;
        } else {
            self.ref_width = lo;
            self.ref_height = hi;
        }
        self.init_projection(screen_width, screen_height);
        old
    }

    fn init_projection(&mut self, screen_width: u32, screen_height: u32) {
        self.screen_width = screen_width;
        self.screen_height = screen_height;

        let min = screen_width.min(screen_height).max(1) as f32;
        let max = screen_width.max(screen_height) as f32;
        let aspect = (max / min).max(1.0);
        if screen_width <= screen_height {
            self.width = 1.0;
            self.height = aspect;
        } else {
            self.width = aspect;
            self.height = 1.0;
        }
    }

    pub fn local_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width as f32, self.screen_height as f32)
    }

    pub fn ref_size(&self) -> Vec2 {
        Vec2::new(self.ref_width as f32, self.ref_height as f32)
    }

    pub fn is_landscape(&self) -> bool {
        self.screen_width > self.screen_height
    }

    pub fn screen_to_local(&self, screen: Vec2) -> Vec2 {
        screen * self.local_size() / self.screen_size()
    }

    pub fn local_to_screen(&self, local: Vec2) -> Vec2 {
        local * self.screen_size() / self.local_size()
    }

    pub fn local_to_ref(&self, local: Vec2) -> Vec2 {
        local * self.ref_size() / self.local_size()
    }

    pub fn ref_to_local(&self, reference: Vec2) -> Vec2 {
        reference * self.local_size() / self.ref_size()
    }

    pub fn screen_ref_scale(&self) -> Vec2 {
        self.ref_size() / self.screen_size()
    }

    /// Uniform factor that fits the reference layout on this screen.
    pub fn aspect_scale_factor(&self) -> f32 {
        let s = self.screen_ref_scale();
        1.0 / s.x.max(s.y)
    }

    /// Top-left offset centring the fitted reference layout.
    pub fn screen_ref_pos(&self) -> Vec2 {
        (Vec2::splat(1.0) - self.screen_ref_scale() * self.aspect_scale_factor()) / 2.0
    }
}
