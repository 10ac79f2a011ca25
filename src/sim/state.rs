//! Authoritative world state and core entity types
//!
//! The tick loop is the only writer. Collections are kept sorted by id so
//! every phase iterates in creation order.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::tank::Tank;
use crate::config::{ArenaBounds, ArenaConfig};
use crate::error::LoadFault;
use crate::standings::Standings;

/// Stable tank identifier (index in entrant order)
pub type TankId = u32;

/// Active ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    /// Coin collection against the clock
    Scramble,
    /// Maze deathmatch with a shrinking zone and orbital hazards
    Labyrinth,
    /// Two tanks against the boss
    Juggernaut,
}

impl ModeKind {
    /// Numeric id exposed to bots
    pub fn id(self) -> u8 {
        match self {
            ModeKind::Scramble => 1,
            ModeKind::Labyrinth => 2,
            ModeKind::Juggernaut => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Scramble => "Scramble",
            ModeKind::Labyrinth => "Labyrinth",
            ModeKind::Juggernaut => "Juggernaut",
        }
    }

    /// Entrant count a ruleset is built for, if it only supports one
    pub fn fixed_entrants(&self) -> Option<usize> {
        match self {
            ModeKind::Juggernaut => Some(2),
            ModeKind::Scramble | ModeKind::Labyrinth => None,
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shooter {
    Tank(TankId),
    Boss,
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: Shooter,
    /// Damage fixed at creation (criticals already applied)
    pub damage: f32,
    pub critical: bool,
    /// Knockback strength applied on a damaging hit (0 = none)
    pub knockback: f32,
    pub half_extent: f32,
    pub alive: bool,
}

impl Projectile {
    pub fn rect(&self) -> Aabb {
        Aabb::around(self.pos, self.half_extent)
    }

    /// Advance at constant velocity; dies on leaving the arena
    pub fn advance(&mut self, dt: f32, bounds: &ArenaBounds) {
        self.pos += self.vel * dt;
        if self.pos.x < 0.0
            || self.pos.x > bounds.width
            || self.pos.y < 0.0
            || self.pos.y > bounds.height
        {
            self.alive = false;
        }
    }
}

/// Immutable axis-aligned obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub rect: Aabb,
}

impl Wall {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Aabb::new(x, y, width, height),
        }
    }
}

/// Collectible coin (scramble only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
    pub collected: bool,
}

/// Hazard zone lifecycle stage, as seen by observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardStage {
    Warning,
    Active,
    Dead,
}

/// Boss weapon stage, as seen by bots and observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponStage {
    Idle,
    Charge,
    Burst,
}

/// Classification of a decision fault for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    Load,
    Runtime,
    Timeout,
}

/// Result of the last decision phase for a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// No action was applied (idle, malformed, faulted or disabled)
    #[default]
    None,
    /// A validated action was applied
    Applied,
    /// The decision overran its budget ("lag")
    TimedOut,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Scramble: full ranking plus the tanks that advance
    Ranked {
        standings: Standings,
        advancing: Vec<TankId>,
    },
    /// Labyrinth: every tank alive at the end
    Survivors(Vec<TankId>),
    /// Juggernaut: the last tank standing
    Champion(TankId),
    /// Juggernaut: nobody survived
    Draw,
}

/// Lifecycle events for rendering/audio/UI collaborators
///
/// Queued during a tick and released together at its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TankDestroyed {
        tank: TankId,
        position: Vec2,
    },
    ProjectileFired {
        owner: Shooter,
        position: Vec2,
        angle: f32,
        critical: bool,
    },
    CoinCollected {
        tank: TankId,
        coin: u32,
    },
    /// Top of the coin ranking changed order
    StandingsChanged {
        leaders: Vec<TankId>,
    },
    HazardPhaseChanged {
        hazard: u32,
        position: Vec2,
        stage: HazardStage,
    },
    HazardBlast {
        hazard: u32,
        position: Vec2,
    },
    BossPhaseChanged {
        stage: WeaponStage,
    },
    DecisionFault {
        tank: TankId,
        kind: FaultKind,
        message: String,
    },
    ModeEnded {
        mode: ModeKind,
        outcome: Outcome,
    },
}

impl GameEvent {
    pub(crate) fn load_fault(tank: TankId, fault: &LoadFault) -> Self {
        GameEvent::DecisionFault {
            tank,
            kind: FaultKind::Load,
            message: fault.to_string(),
        }
    }
}

/// Everything the tick loop owns and mutates
#[derive(Debug, Clone)]
pub struct World {
    pub mode: ModeKind,
    pub bounds: ArenaBounds,
    /// Tanks in id order; dead tanks stay as markers
    pub tanks: Vec<Tank>,
    /// Live projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    pub walls: Vec<Wall>,
    /// Live coins (sorted by id for determinism)
    pub coins: Vec<Coin>,
    /// Engine RNG, consumed in a fixed order each tick
    pub rng: Pcg32,
    /// Simulated seconds since setup
    pub elapsed: f32,
    /// Simulation tick counter
    pub ticks: u64,
    /// Events raised during the current tick
    pending: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl World {
    /// Empty world for the given mode, RNG seeded from the config
    pub fn new(mode: ModeKind, config: &ArenaConfig) -> Self {
        Self {
            mode,
            bounds: config.arena,
            tanks: Vec::new(),
            projectiles: Vec::new(),
            walls: Vec::new(),
            coins: Vec::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            elapsed: 0.0,
            ticks: 0,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.bounds.width / 2.0, self.bounds.height / 2.0)
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.tanks.iter().filter(|t| t.alive).count()
    }

    pub fn alive_ids(&self) -> Vec<TankId> {
        self.tanks.iter().filter(|t| t.alive).map(|t| t.id).collect()
    }

    /// Queue an event for release at the end of the tick
    pub fn emit(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Apply damage to the tank at `index`, raising the death event once
    pub fn hurt(&mut self, index: usize, damage: f32) {
        let Some(tank) = self.tanks.get_mut(index) else {
            return;
        };
        if tank.take_damage(damage) {
            let event = GameEvent::TankDestroyed {
                tank: tank.id,
                position: tank.pos,
            };
            log::info!("Tank {} ({}) destroyed", tank.id, tank.team);
            self.pending.push(event);
        }
    }

    /// Spawn a projectile and announce it
    pub fn launch(&mut self, mut projectile: Projectile, angle: f32) {
        projectile.id = self.next_entity_id();
        self.pending.push(GameEvent::ProjectileFired {
            owner: projectile.owner,
            position: projectile.pos,
            angle,
            critical: projectile.critical,
        });
        self.projectiles.push(projectile);
    }

    /// Drop dead projectiles and collected coins
    pub fn sweep(&mut self) {
        self.projectiles.retain(|p| p.alive);
        self.coins.retain(|c| !c.collected);
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.tanks.sort_by_key(|t| t.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.coins.sort_by_key(|c| c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectile_dies_out_of_bounds() {
        let bounds = ArenaBounds {
            width: 100.0,
            height: 100.0,
        };
        let mut p = Projectile {
            id: 1,
            pos: Vec2::new(95.0, 50.0),
            vel: Vec2::new(600.0, 0.0),
            owner: Shooter::Boss,
            damage: 1.0,
            critical: false,
            knockback: 0.0,
            half_extent: 2.0,
            alive: true,
        };
        p.advance(1.0 / 60.0, &bounds);
        assert!(!p.alive);
    }

    #[test]
    fn test_entity_ids_are_unique_and_increasing() {
        let mut world = World::new(ModeKind::Scramble, &ArenaConfig::default());
        let a = world.next_entity_id();
        let b = world.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_same_seed_same_rng_stream() {
        use rand::Rng;
        let config = ArenaConfig::with_seed(42);
        let mut w1 = World::new(ModeKind::Labyrinth, &config);
        let mut w2 = World::new(ModeKind::Labyrinth, &config);
        let a: Vec<f32> = (0..8).map(|_| w1.rng.random()).collect();
        let b: Vec<f32> = (0..8).map(|_| w2.rng.random()).collect();
        assert_eq!(a, b);
    }
}
