//! Tank Arena - a tick-based arena where independently written bots fight
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, rulesets, tick loop)
//! - `sandbox`: Fault-isolated, time-budgeted execution of bot logic
//! - `config`: Tunable constants, built once and passed by reference
//! - `standings`: Coin ranking used by the scramble ruleset
//! - `bots`: Built-in reference bots and the name → loader roster

pub mod bots;
pub mod config;
pub mod error;
pub mod sandbox;
pub mod sim;
pub mod standings;

pub use config::ArenaConfig;
pub use error::{ConfigError, DecisionFault, LoadFault};
pub use standings::Standings;

use glam::Vec2;

/// Engine-wide timing constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Unit vector pointing along an angle given in degrees
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle in degrees of the vector from `from` to `to`
#[inline]
pub fn heading_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(190.0) - (-170.0)).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((normalize_degrees(45.0) - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_heading_and_direction_agree() {
        let from = Vec2::new(10.0, 10.0);
        let to = Vec2::new(10.0, 30.0);
        let heading = heading_degrees(from, to);
        assert!((heading - 90.0).abs() < 1e-4);
        let dir = direction_from_degrees(heading);
        assert!(dir.x.abs() < 1e-5);
        assert!((dir.y - 1.0).abs() < 1e-5);
    }
}
