//! Axis-aligned rectangles in tile units

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle: top-left corner plus size. +y points down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }

    /// The unit square of the tile whose corner is `pos`
    pub fn tile(pos: Vec2) -> Self {
        Self {
            min: pos,
            size: Vec2::ONE,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Shrink by `amount` on the left and right sides
    pub fn shrink_x(&self, amount: f32) -> Self {
        Self::new(
            self.left() + amount,
            self.top(),
            self.width() - 2.0 * amount,
            self.height(),
        )
    }

    /// Shrink by `amount` on the top and bottom sides
    pub fn shrink_y(&self, amount: f32) -> Self {
        Self::new(
            self.left(),
            self.top() + amount,
            self.width(),
            self.height() - 2.0 * amount,
        )
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 1.0, 1.0);
        let b = Aabb::new(1.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.translate(Vec2::new(-0.01, 0.0))));
    }

    #[test]
    fn test_shrink() {
        let a = Aabb::new(2.0, 3.0, 1.0, 1.0).shrink_y(0.05);
        assert!((a.top() - 3.05).abs() < 1e-6);
        assert!((a.bottom() - 3.95).abs() < 1e-6);
        assert_eq!(a.left(), 2.0);
    }
}
