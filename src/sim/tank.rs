//! Tank body: force-accumulation physics, engine jams and the gun
//!
//! Movement input is only ever a force; knockback and recoil are impulses
//! that change velocity immediately and are decayed by friction afterwards.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::resolve_wall_contacts;
use super::geometry::Aabb;
use super::state::{ActionOutcome, Projectile, Shooter, TankId, Wall};
use crate::config::{ArenaBounds, ProjectileTuning, TankTuning};
use crate::{direction_from_degrees, normalize_degrees};

/// What happened to a move input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Converted into engine force
    Applied,
    /// Ignored because the engine is already jammed
    Stalled,
    /// This input triggered a new jam and was dropped
    Jammed,
}

/// A bot-controlled tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub team: String,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Accumulated acceleration for the current tick
    pub acc: Vec2,
    /// Facing angle in degrees (follows the last applied move input)
    pub facing: f32,
    pub mass: f32,
    pub friction: f32,
    /// Hitbox edge length
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub coins: u32,
    pub alive: bool,
    pub jammed: bool,
    /// Seconds of jam remaining
    pub jam_timer: f32,
    /// Seconds until the gun can fire again
    pub shoot_cooldown: f32,
    pub last_outcome: ActionOutcome,
    /// Where the tank was placed at setup
    pub spawn_point: Vec2,
}

impl Tank {
    pub fn new(id: TankId, team: impl Into<String>, pos: Vec2, facing: f32, tuning: &TankTuning) -> Self {
        Self {
            id,
            team: team.into(),
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            facing: normalize_degrees(facing),
            mass: tuning.mass,
            friction: tuning.friction,
            size: tuning.size,
            health: tuning.max_health,
            max_health: tuning.max_health,
            ammo: tuning.max_ammo,
            max_ammo: tuning.max_ammo,
            coins: 0,
            alive: true,
            jammed: false,
            jam_timer: 0.0,
            shoot_cooldown: 0.0,
            last_outcome: ActionOutcome::None,
            spawn_point: pos,
        }
    }

    /// Scale health and its cap (boss ruleset)
    pub fn with_health_multiplier(mut self, multiplier: f32) -> Self {
        self.max_health *= multiplier;
        self.health = self.max_health;
        self
    }

    pub fn rect(&self) -> Aabb {
        Aabb::around(self.pos, self.size / 2.0)
    }

    /// Accumulate a force for this tick (a = F / m)
    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force / self.mass;
    }

    /// Instantaneous velocity change, bypassing the accumulator
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.vel += impulse;
    }

    /// Knock the tank along `direction` (normalized here) with a strength
    pub fn knock(&mut self, direction: Vec2, strength: f32, scale: f32) {
        let dir = direction.normalize_or_zero();
        self.apply_impulse(dir * strength * scale);
    }

    /// Zero velocity immediately
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }

    /// Turn a move input into engine force, subject to jams
    ///
    /// The jam roll happens on every input that reaches an unjammed engine,
    /// so the RNG is consumed before any critical-hit roll of the same tick.
    pub fn drive<R: Rng>(&mut self, input: Vec2, tuning: &TankTuning, rng: &mut R) -> Drive {
        if self.jammed {
            return Drive::Stalled;
        }
        if rng.random::<f32>() < tuning.jam_chance {
            self.jammed = true;
            self.jam_timer = tuning.jam_duration;
            return Drive::Jammed;
        }

        let len = input.length();
        if len > 0.0 && len.is_finite() {
            let dir = input / len;
            self.apply_force(dir * tuning.engine_force);
            self.facing = dir.y.atan2(dir.x).to_degrees();
        }
        Drive::Applied
    }

    /// Whether the gun is ready (ammo, no jam, cooldown expired)
    pub fn can_fire(&self) -> bool {
        self.alive && !self.jammed && self.ammo > 0 && self.shoot_cooldown <= 0.0
    }

    /// Fire along an absolute angle in degrees
    ///
    /// Returns the projectile to spawn; the world assigns its id.
    pub fn fire<R: Rng>(
        &mut self,
        angle: f32,
        tuning: &TankTuning,
        shots: &ProjectileTuning,
        rng: &mut R,
    ) -> Option<Projectile> {
        if !self.can_fire() {
            return None;
        }

        self.ammo -= 1;
        self.shoot_cooldown = tuning.shoot_cooldown;

        let dir = direction_from_degrees(angle);
        self.apply_impulse(-dir * tuning.recoil_impulse);

        let critical = rng.random::<f32>() < shots.critical_chance;
        let damage = if critical {
            shots.damage * shots.critical_multiplier
        } else {
            shots.damage
        };

        Some(Projectile {
            id: 0,
            pos: self.pos + dir * (self.size / 2.0 + tuning.muzzle_gap),
            vel: dir * shots.speed,
            owner: Shooter::Tank(self.id),
            damage,
            critical,
            knockback: 0.0,
            half_extent: shots.half_extent,
            alive: true,
        })
    }

    /// Apply damage; returns true only on the tick the tank dies
    pub fn take_damage(&mut self, damage: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - damage.max(0.0)).max(0.0);
        if self.health <= 0.0 {
            self.alive = false;
            self.vel = Vec2::ZERO;
            self.acc = Vec2::ZERO;
            return true;
        }
        false
    }

    /// One integration step: friction, explicit Euler, clamp, wall sliding
    pub fn integrate(&mut self, dt: f32, tuning: &TankTuning, bounds: &ArenaBounds, walls: &[Wall]) {
        // Jams wear off here, never blocking passive physics
        if self.jam_timer > 0.0 {
            self.jam_timer -= dt;
            self.jammed = self.jam_timer > 0.0;
            if !self.jammed {
                self.jam_timer = 0.0;
            }
        }

        let speed = self.vel.length();
        if speed > tuning.min_speed {
            self.apply_force(-self.vel * self.friction);
        }

        self.vel += self.acc * dt;
        self.pos += self.vel * dt;
        self.acc = Vec2::ZERO;

        let margin = tuning.edge_margin;
        self.pos.x = self.pos.x.clamp(margin, (bounds.width - margin).max(margin));
        self.pos.y = self.pos.y.clamp(margin, (bounds.height - margin).max(margin));

        resolve_wall_contacts(self, walls);

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        }
    }
}
