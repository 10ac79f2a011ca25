//! Ruleset controllers
//!
//! Each controller owns its mode-specific entities and decides when the
//! session ends. Updates run once per tick after tank integration.

pub mod juggernaut;
pub mod labyrinth;
pub mod scramble;

pub use juggernaut::{Boss, Juggernaut, WeaponPhase};
pub use labyrinth::{HazardPhase, HazardZone, Labyrinth, ShrinkingZone};
pub use scramble::Scramble;

use glam::Vec2;
use std::f32::consts::TAU;

use super::context::BossView;
use super::state::{ModeKind, Outcome, World};
use crate::config::{ArenaBounds, ArenaConfig};
use crate::heading_degrees;

#[derive(Debug, Clone)]
pub enum ModeController {
    Scramble(Scramble),
    Labyrinth(Labyrinth),
    Juggernaut(Juggernaut),
}

impl ModeController {
    /// Build mode entities for a world whose tanks are already placed
    pub fn setup(world: &mut World, config: &ArenaConfig) -> Self {
        match world.mode {
            ModeKind::Scramble => Self::Scramble(Scramble::setup(world, &config.scramble)),
            ModeKind::Labyrinth => Self::Labyrinth(Labyrinth::setup(world, &config.labyrinth)),
            ModeKind::Juggernaut => Self::Juggernaut(Juggernaut::setup(world, &config.juggernaut)),
        }
    }

    /// Timed updates and the end-condition check
    pub fn update(&mut self, world: &mut World, config: &ArenaConfig, dt: f32) -> Option<Outcome> {
        match self {
            Self::Scramble(s) => s.update(world, &config.scramble, dt),
            Self::Labyrinth(l) => l.update(world, &config.labyrinth, &config.tank, dt),
            Self::Juggernaut(j) => j.update(world, &config.juggernaut, &config.tank, dt),
        }
    }

    /// Seconds on the session clock, for timed rulesets
    pub fn time_left(&self) -> Option<f32> {
        match self {
            Self::Scramble(s) => Some(s.time_left),
            _ => None,
        }
    }

    pub fn boss(&self) -> Option<&Boss> {
        match self {
            Self::Juggernaut(j) => Some(&j.boss),
            _ => None,
        }
    }

    pub fn boss_view(&self) -> Option<BossView> {
        self.boss().map(Boss::view)
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Scramble(_) => ModeKind::Scramble,
            Self::Labyrinth(_) => ModeKind::Labyrinth,
            Self::Juggernaut(_) => ModeKind::Juggernaut,
        }
    }
}

/// Evenly spaced spawn points on a circle around the centre
///
/// Returns `(position, facing)` pairs, each facing the centre.
pub fn spawn_ring(count: usize, bounds: &ArenaBounds) -> Vec<(Vec2, f32)> {
    let center = Vec2::new(bounds.width / 2.0, bounds.height / 2.0);
    let radius = bounds.width.min(bounds.height) / 3.0;

    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32;
            let pos = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            (pos, heading_degrees(pos, center))
        })
        .collect()
}
