//! Collision detection and response for box-shaped bodies
//!
//! Tanks slide along walls: each overlap is resolved along the axis of least
//! penetration only, so the velocity component parallel to the wall survives.

use glam::Vec2;

use super::geometry::Aabb;
use super::state::Wall;
use super::tank::Tank;

/// Extra push past contact so the next tick starts separated
pub const CONTACT_SLOP: f32 = 1.0;

/// Upper bound on re-test passes when several walls overlap at once
const MAX_RESOLVE_PASSES: usize = 4;

/// Axis along which a contact was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAxis {
    X,
    Y,
}

/// Result of resolving one tank/wall contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub axis: ContactAxis,
    /// Displacement applied to the tank
    pub push: Vec2,
}

/// Push a box out of a wall along its minimum-overlap axis
///
/// Returns `None` when the boxes do not overlap.
pub fn resolve_box_wall(body: &Aabb, wall: &Aabb) -> Option<Contact> {
    let pen = body.penetration(wall)?;

    let contact = if pen.min_x() < pen.min_y() {
        let dx = if pen.left < pen.right {
            -(pen.left + CONTACT_SLOP)
        } else {
            pen.right + CONTACT_SLOP
        };
        Contact {
            axis: ContactAxis::X,
            push: Vec2::new(dx, 0.0),
        }
    } else {
        let dy = if pen.top < pen.bottom {
            -(pen.top + CONTACT_SLOP)
        } else {
            pen.bottom + CONTACT_SLOP
        };
        Contact {
            axis: ContactAxis::Y,
            push: Vec2::new(0.0, dy),
        }
    };
    Some(contact)
}

/// Resolve every wall the tank overlaps, re-testing after each push
///
/// Returns the number of contacts resolved.
pub fn resolve_wall_contacts(tank: &mut Tank, walls: &[Wall]) -> usize {
    let mut resolved = 0;

    for _ in 0..MAX_RESOLVE_PASSES {
        let mut any = false;
        for wall in walls {
            if let Some(contact) = resolve_box_wall(&tank.rect(), &wall.rect) {
                tank.pos += contact.push;
                match contact.axis {
                    ContactAxis::X => tank.vel.x = 0.0,
                    ContactAxis::Y => tank.vel.y = 0.0,
                }
                resolved += 1;
                any = true;
            }
        }
        if !any {
            break;
        }
    }

    resolved
}

/// True if the box overlaps any wall
pub fn hits_any_wall(body: &Aabb, walls: &[Wall]) -> bool {
    walls.iter().any(|w| body.overlaps(&w.rect))
}

/// Circle/point proximity used for boss contact and hazard radii
#[inline]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) < radius
}

/// Direction pointing from `source` toward `target`, or +x when they coincide
pub fn push_direction(source: Vec2, target: Vec2) -> Vec2 {
    let d = target - source;
    if d.length_squared() > f32::EPSILON {
        d.normalize()
    } else {
        Vec2::X
    }
}
