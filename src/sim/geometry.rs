//! Axis-aligned rectangle geometry for walls, tanks, coins and projectiles
//!
//! Every hitbox in the arena is an AABB. Overlap tests are strict: rectangles
//! that only share an edge do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Rectangle from its top-left corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Square centred on `center` with the given half edge
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let half = Vec2::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Penetration of `self` into `other` on each side
    ///
    /// Returns `None` when the boxes do not overlap.
    pub fn penetration(&self, other: &Aabb) -> Option<Penetration> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Penetration {
            left: self.max.x - other.min.x,
            right: other.max.x - self.min.x,
            top: self.max.y - other.min.y,
            bottom: other.max.y - self.min.y,
        })
    }

    /// Clip the segment `start → end` against this rectangle (Liang-Barsky)
    ///
    /// Returns the parameter `t` in [0, 1] of the first point of the segment
    /// inside the rectangle. A segment starting inside yields `Some(0.0)`.
    pub fn clip_segment(&self, start: Vec2, end: Vec2) -> Option<f32> {
        let d = end - start;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        let checks = [
            (-d.x, start.x - self.min.x),
            (d.x, self.max.x - start.x),
            (-d.y, start.y - self.min.y),
            (d.y, self.max.y - start.y),
        ];

        for (p, q) in checks {
            if p == 0.0 {
                // Parallel to this slab
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter)
    }
}

/// Overlap depths of one box into another, per side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Push needed toward -x to leave through the other box's left edge
    pub left: f32,
    /// Push needed toward +x to leave through the right edge
    pub right: f32,
    /// Push needed toward -y to leave through the top edge
    pub top: f32,
    /// Push needed toward +y to leave through the bottom edge
    pub bottom: f32,
}

impl Penetration {
    #[inline]
    pub fn min_x(&self) -> f32 {
        self.left.min(self.right)
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.top.min(self.bottom)
    }
}
