//! Arena configuration
//!
//! Built once at startup and handed to the session by value; every component
//! reads it through a shared reference. Loading from disk is the caller's job,
//! which is why every section derives serde with defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Arena rectangle (origin at top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Tank body, engine and gun
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    /// Hitbox edge length (square)
    pub size: f32,
    /// Force applied along the normalized move input
    pub engine_force: f32,
    /// Friction coefficient (force = -velocity * friction)
    pub friction: f32,
    pub mass: f32,
    /// Below this speed friction is not applied (avoids jitter)
    pub min_speed: f32,
    pub max_health: f32,
    pub max_ammo: u32,
    /// Seconds between shots
    pub shoot_cooldown: f32,
    /// Backward velocity kick on firing
    pub recoil_impulse: f32,
    /// Extra distance beyond the hull where projectiles spawn
    pub muzzle_gap: f32,
    /// Probability that a move input jams the engine
    pub jam_chance: f32,
    /// Seconds a jam lasts
    pub jam_duration: f32,
    /// Multiplier turning a knockback strength into a velocity impulse
    pub knockback_scale: f32,
    /// Tank centres are kept this far from the arena edge
    pub edge_margin: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            size: 40.0,
            engine_force: 1200.0,
            friction: 5.0,
            mass: 1.0,
            min_speed: 0.5,
            max_health: 1500.0,
            max_ammo: 1500,
            shoot_cooldown: 0.2,
            recoil_impulse: 6.0,
            muzzle_gap: 5.0,
            jam_chance: 0.005,
            jam_duration: 1.0,
            knockback_scale: 15.0,
            edge_margin: 40.0,
        }
    }
}

/// Tank-fired projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub damage: f32,
    /// Half edge of the projectile hitbox
    pub half_extent: f32,
    pub critical_chance: f32,
    pub critical_multiplier: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 720.0,
            damage: 15.0,
            half_extent: 6.0,
            critical_chance: 0.10,
            critical_multiplier: 3.0,
        }
    }
}

/// Coin-collection ruleset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrambleRules {
    /// Session length in seconds
    pub duration: f32,
    pub coin_spawn_interval: f32,
    pub max_coins: usize,
    pub coin_size: f32,
    pub coin_value: u32,
    /// Knockback strength of a bullet hit (no damage in this ruleset)
    pub knockback: f32,
    /// Number of top-ranked tanks recorded as advancing
    pub advancing: usize,
    /// Coins never spawn closer than this to a tank
    pub spawn_clearance: f32,
    /// Coins spawn at least this far from the arena edge
    pub spawn_inset: f32,
    pub spawn_attempts: u32,
}

impl Default for ScrambleRules {
    fn default() -> Self {
        Self {
            duration: 60.0,
            coin_spawn_interval: 0.25,
            max_coins: 20,
            coin_size: 20.0,
            coin_value: 1,
            knockback: 20.0,
            advancing: 2,
            spawn_clearance: 80.0,
            spawn_inset: 50.0,
            spawn_attempts: 10,
        }
    }
}

/// Shrinking-zone deathmatch ruleset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabyrinthRules {
    /// Seconds between zone steps
    pub shrink_interval: f32,
    /// Margin added to the target per step
    pub shrink_step: f32,
    /// Fraction of the remaining gap closed per second while smoothing
    pub shrink_smoothing: f32,
    /// Damage per second inside the margin band
    pub zone_dps: f32,
    /// Session ends once alive tanks <= this
    pub survivors: usize,
    pub hazard_interval: f32,
    pub hazard_warning: f32,
    pub hazard_active: f32,
    pub hazard_radius: f32,
    pub hazard_damage: f32,
    pub hazard_knockback: f32,
    pub hazard_blast_interval: f32,
    pub hazard_attempts: u32,
}

impl Default for LabyrinthRules {
    fn default() -> Self {
        Self {
            shrink_interval: 13.0,
            shrink_step: 50.0,
            shrink_smoothing: 1.2,
            zone_dps: 50.0,
            survivors: 2,
            hazard_interval: 10.0,
            hazard_warning: 2.0,
            hazard_active: 5.0,
            hazard_radius: 120.0,
            hazard_damage: 75.0,
            hazard_knockback: 40.0,
            hazard_blast_interval: 0.5,
            hazard_attempts: 10,
        }
    }
}

/// Boss ruleset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JuggernautRules {
    /// Body diameter
    pub size: f32,
    /// Approach speed (px/s)
    pub speed: f32,
    /// Contact damage per second
    pub melee_dps: f32,
    pub melee_knockback: f32,
    /// Seconds tracking before the charge telegraph (tunable, may be zero)
    pub idle_time: f32,
    /// Seconds of telegraph before the burst (tunable, may be zero)
    pub charge_time: f32,
    /// Pulses per burst
    pub burst_count: u32,
    pub burst_interval: f32,
    pub shot_speed: f32,
    pub shot_damage: f32,
    pub shot_half_extent: f32,
    pub shot_knockback: f32,
    /// Muzzle distance beyond the body radius
    pub muzzle_gap: f32,
    /// Tank health is scaled by this in the boss ruleset
    pub tank_health_multiplier: f32,
}

impl Default for JuggernautRules {
    fn default() -> Self {
        Self {
            size: 120.0,
            speed: 20.0,
            melee_dps: 300.0,
            melee_knockback: 800.0,
            idle_time: 0.0,
            charge_time: 0.0,
            burst_count: 10,
            burst_interval: 0.2,
            shot_speed: 360.0,
            shot_damage: 50.0,
            shot_half_extent: 10.0,
            shot_knockback: 1000.0,
            muzzle_gap: 10.0,
            tank_health_multiplier: 2.0,
        }
    }
}

/// Decision execution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxTuning {
    /// Wall-clock budget per decision call, in milliseconds
    pub budget_ms: u64,
    /// Sensor ray length
    pub sensor_range: f32,
    /// Whisker offset from facing, in degrees
    pub sensor_spread: f32,
}

impl Default for SandboxTuning {
    fn default() -> Self {
        Self {
            budget_ms: 100,
            sensor_range: 300.0,
            sensor_spread: 30.0,
        }
    }
}

impl SandboxTuning {
    pub fn budget(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.budget_ms)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Seed for the engine RNG (jams, criticals, spawns)
    pub seed: u64,
    /// Fixed ticks per second
    pub tick_rate: f32,
    pub arena: ArenaBounds,
    pub tank: TankTuning,
    pub projectile: ProjectileTuning,
    pub scramble: ScrambleRules,
    pub labyrinth: LabyrinthRules,
    pub juggernaut: JuggernautRules,
    pub sandbox: SandboxTuning,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            tick_rate: 60.0,
            arena: ArenaBounds::default(),
            tank: TankTuning::default(),
            projectile: ProjectileTuning::default(),
            scramble: ScrambleRules::default(),
            labyrinth: LabyrinthRules::default(),
            juggernaut: JuggernautRules::default(),
            sandbox: SandboxTuning::default(),
        }
    }
}

impl ArenaConfig {
    /// Default tuning with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Length of one fixed tick in seconds
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(ConfigError::EmptyArena {
                width: self.arena.width,
                height: self.arena.height,
            });
        }
        if !(self.tick_rate > 0.0) {
            return Err(ConfigError::TickRate(self.tick_rate));
        }

        probability("tank.jam_chance", self.tank.jam_chance)?;
        probability("projectile.critical_chance", self.projectile.critical_chance)?;

        positive("tank.size", self.tank.size)?;
        positive("tank.mass", self.tank.mass)?;
        positive("tank.max_health", self.tank.max_health)?;
        positive("scramble.coin_spawn_interval", self.scramble.coin_spawn_interval)?;
        positive("labyrinth.shrink_interval", self.labyrinth.shrink_interval)?;
        positive("labyrinth.hazard_interval", self.labyrinth.hazard_interval)?;
        positive("labyrinth.hazard_blast_interval", self.labyrinth.hazard_blast_interval)?;
        positive("juggernaut.size", self.juggernaut.size)?;
        positive(
            "juggernaut.tank_health_multiplier",
            self.juggernaut.tank_health_multiplier,
        )?;

        non_negative("tank.friction", self.tank.friction)?;
        non_negative("tank.shoot_cooldown", self.tank.shoot_cooldown)?;
        non_negative("tank.jam_duration", self.tank.jam_duration)?;
        non_negative("scramble.duration", self.scramble.duration)?;
        non_negative("scramble.coin_size", self.scramble.coin_size)?;
        non_negative("scramble.spawn_clearance", self.scramble.spawn_clearance)?;
        non_negative("labyrinth.zone_dps", self.labyrinth.zone_dps)?;
        non_negative("labyrinth.shrink_smoothing", self.labyrinth.shrink_smoothing)?;
        non_negative("labyrinth.hazard_radius", self.labyrinth.hazard_radius)?;
        non_negative("labyrinth.hazard_warning", self.labyrinth.hazard_warning)?;
        non_negative("labyrinth.hazard_active", self.labyrinth.hazard_active)?;
        non_negative("juggernaut.speed", self.juggernaut.speed)?;
        non_negative("juggernaut.idle_time", self.juggernaut.idle_time)?;
        non_negative("juggernaut.charge_time", self.juggernaut.charge_time)?;
        non_negative("juggernaut.burst_interval", self.juggernaut.burst_interval)?;
        non_negative("sandbox.sensor_range", self.sandbox.sensor_range)?;

        Ok(())
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
