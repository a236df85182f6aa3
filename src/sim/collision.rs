//! Overlap tests for rectangular hitboxes
//!
//! Every gameplay pairing (bullets vs enemies, enemy fire vs the ship, bodies
//! vs the ship) uses centre-based axis-aligned boxes. Touching edges count as
//! a hit. Rocket splash tests a circle against the enemy boxes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box described by its centre and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }

    /// True when the boxes overlap or touch
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        !(a_max.x < b_min.x || a_min.x > b_max.x || a_max.y < b_min.y || a_min.y > b_max.y)
    }

    /// Closest point inside the box to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// True when a circle reaches into the box
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = self.closest_point(center);
        (closest - center).length_squared() <= radius * radius
    }
}

/// Box overlap between two centred hitboxes
#[inline]
pub fn aabb_hit(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}

/// Whether a point has left the playfield by more than `slack`
#[inline]
pub fn out_of_bounds(pos: Vec2, width: f32, height: f32, slack: f32) -> bool {
    pos.y < -slack || pos.y > height + slack || pos.x < -slack || pos.x > width + slack
}
