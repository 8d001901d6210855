//! Geometry helpers shared by every system.
//!
//! Vectors are `glam::Vec2`. Obstacles are axis-aligned rectangles described
//! by their top-left corner and size, in viewport units (y grows downward).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (static obstacle or viewport bounds).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict point containment (points on the edge are outside).
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// Disc overlap using the radius-inflated box test.
    ///
    /// This is the box-vs-box test of the disc's bounding square, so corners
    /// are slightly conservative compared to a true circle test.
    #[inline]
    pub fn overlaps_disc(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius > self.x
            && center.x - radius < self.right()
            && center.y + radius > self.y
            && center.y - radius < self.bottom()
    }

    /// True if the point lies outside the closed rectangle.
    #[inline]
    pub fn excludes_point(&self, p: Vec2) -> bool {
        p.x < self.x || p.x > self.right() || p.y < self.y || p.y > self.bottom()
    }
}

/// Unit vector pointing along `angle` (radians, 0 = +x, clockwise on screen).
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the direction from `from` to `to`. Zero when the points coincide.
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Clamp a disc center so the whole disc stays inside `[0, width] x [0, height]`.
///
/// Uses `min`/`max` rather than `f32::clamp` so a viewport narrower than the
/// disc pins it to the lower bound instead of panicking.
#[inline]
pub fn clamp_disc_to_bounds(center: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        center.x.min(width - radius).max(radius),
        center.y.min(height - radius).max(radius),
    )
}
