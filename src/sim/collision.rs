//! Axis-aligned box collision
//!
//! Player and projectiles are square hitboxes centred on their position.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square box of side `size` centred on `center`
    pub fn from_center(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Grow the box by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap test; boxes that only touch edges do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Clamp a centre point so a box of side `size` stays inside `self`
    pub fn clamp_center(&self, center: Vec2, size: f32) -> Vec2 {
        let half = size / 2.0;
        // A box larger than the area pins to the middle on that axis
        let clamp_axis = |value: f32, lo: f32, hi: f32| {
            if lo > hi {
                (lo + hi) / 2.0
            } else {
                value.clamp(lo, hi)
            }
        };
        Vec2::new(
            clamp_axis(center.x, self.min.x + half, self.max.x - half),
            clamp_axis(center.y, self.min.y + half, self.max.y - half),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::from_center(Vec2::new(0.0, 0.0), 10.0);
        let b = Aabb::from_center(Vec2::new(8.0, 8.0), 10.0);
        let c = Aabb::from_center(Vec2::new(20.0, 0.0), 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::from_center(Vec2::new(0.0, 0.0), 10.0);
        let b = Aabb::from_center(Vec2::new(10.0, 0.0), 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_clamp_center() {
        let area = Aabb::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
        let clamped = area.clamp_center(Vec2::new(-30.0, 70.0), 10.0);
        assert_eq!(clamped, Vec2::new(5.0, 45.0));

        let oversized = area.clamp_center(Vec2::new(0.0, 0.0), 80.0);
        assert_eq!(oversized.y, 25.0);
    }
}
