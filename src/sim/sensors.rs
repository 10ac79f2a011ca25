//! Whisker raycasts against static walls

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Wall;
use crate::direction_from_degrees;

/// Distances reported by the three whiskers, each in [0, range]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensors {
    pub front: f32,
    /// Whisker at facing - spread
    pub left: f32,
    /// Whisker at facing + spread
    pub right: f32,
}

impl Sensors {
    /// All whiskers clear
    pub fn clear(range: f32) -> Self {
        Self {
            front: range,
            left: range,
            right: range,
        }
    }
}

/// Distance to the nearest wall along a ray, or `range` if none is hit
pub fn cast_ray(origin: Vec2, angle: f32, walls: &[Wall], range: f32) -> f32 {
    let end = origin + direction_from_degrees(angle) * range;
    walls
        .iter()
        .filter_map(|w| w.rect.clip_segment(origin, end))
        .map(|t| t * range)
        .fold(range, f32::min)
}

/// Cast the front, left and right whiskers
pub fn sensor_readings(position: Vec2, facing: f32, walls: &[Wall], range: f32, spread: f32) -> Sensors {
    let read = |offset: f32| round_tenth(cast_ray(position, facing + offset, walls, range));
    Sensors {
        front: read(0.0),
        left: read(-spread),
        right: read(spread),
    }
}

#[inline]
fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_field_reports_range() {
        let s = sensor_readings(Vec2::new(100.0, 100.0), 0.0, &[], 300.0, 30.0);
        assert_eq!(s, Sensors::clear(300.0));
    }

    #[test]
    fn test_front_hits_nearest_wall() {
        let walls = [
            Wall::new(250.0, 0.0, 20.0, 400.0),
            Wall::new(180.0, 80.0, 20.0, 40.0),
        ];
        let s = sensor_readings(Vec2::new(100.0, 100.0), 0.0, &walls, 300.0, 30.0);
        assert!((s.front - 80.0).abs() < 1e-3);
        // Both side whiskers miss the short wall but reach the long one
        assert!(s.left > 80.0 && s.left < 300.0);
        assert!(s.right > 80.0 && s.right < 300.0);
    }

    #[test]
    fn test_left_and_right_whiskers() {
        // Wall only below the tank (y grows downward, +spread turns toward +y)
        let walls = [Wall::new(0.0, 150.0, 1000.0, 20.0)];
        let s = sensor_readings(Vec2::new(100.0, 100.0), 0.0, &walls, 300.0, 30.0);
        assert_eq!(s.front, 300.0);
        assert_eq!(s.left, 300.0);
        // 50 / sin(30°) = 100
        assert!((s.right - 100.0).abs() < 0.11);
    }

    #[test]
    fn test_inside_wall_reads_zero() {
        let walls = [Wall::new(0.0, 0.0, 200.0, 200.0)];
        let s = sensor_readings(Vec2::new(100.0, 100.0), 45.0, &walls, 300.0, 30.0);
        assert_eq!(s.front, 0.0);
    }

    #[test]
    fn test_rounded_to_tenth() {
        let walls = [Wall::new(133.337, 0.0, 10.0, 400.0)];
        let s = sensor_readings(Vec2::new(100.0, 100.0), 0.0, &walls, 300.0, 30.0);
        assert!((s.front - 33.3).abs() < 1e-4);
    }
}
