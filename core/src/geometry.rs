//! Minimal 2D value types used for hit testing and coordinate conversion.

use std::ops::{Add, Div, Mul, Sub};

use serde::Deserialize;

/// A point or size in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component-wise product.
impl Mul for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Component-wise quotient.
impl Div for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned rectangle given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub left_top: Vec2,
    pub right_bottom: Vec2,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left_top: Vec2::new(left, top),
            right_bottom: Vec2::new(right, bottom),
        }
    }

    /// Rectangle of the given size centred on the origin.
    pub fn centered(size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            left_top: Vec2::new(-half.x, -half.y),
            right_bottom: half,
        }
    }

    pub fn offset(&self, pos: Vec2) -> Self {
        Self {
            left_top: self.left_top + pos,
            right_bottom: self.right_bottom + pos,
        }
    }

    pub fn scale(&self, scale: Vec2) -> Self {
        Self {
            left_top: self.left_top * scale,
            right_bottom: self.right_bottom * scale,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left_top.x
            && p.y >= self.left_top.y
            && p.x <= self.right_bottom.x
            && p.y <= self.right_bottom.y
    }

    pub fn width(&self) -> f32 {
        self.right_bottom.x - self.left_top.x
    }

    pub fn height(&self) -> f32 {
        self.right_bottom.y - self.left_top.y
    }

    pub fn center(&self) -> Vec2 {
        (self.left_top + self.right_bottom) / 2.0
    }
}
