//! Two tanks against the juggernaut
//!
//! The boss creeps toward the nearest alive tank and grinds anything it
//! touches. Its cannon cycles Idle → Charge → Burst; every burst pulse fires
//! one heavy shot at each alive tank.

use glam::Vec2;

use crate::config::{ArenaBounds, JuggernautRules, TankTuning};
use crate::heading_degrees;
use crate::sim::collision::{push_direction, within_radius};
use crate::sim::context::BossView;
use crate::sim::state::{GameEvent, Outcome, Projectile, Shooter, TankId, WeaponStage, World};
use crate::sim::tank::Tank;

/// Weapon cycle with the timer data each phase needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponPhase {
    Idle { elapsed: f32 },
    Charge { elapsed: f32 },
    Burst { elapsed: f32, shots_fired: u32, cooldown: f32 },
}

impl WeaponPhase {
    pub fn stage(&self) -> WeaponStage {
        match self {
            WeaponPhase::Idle { .. } => WeaponStage::Idle,
            WeaponPhase::Charge { .. } => WeaponStage::Charge,
            WeaponPhase::Burst { .. } => WeaponStage::Burst,
        }
    }
}

/// What the weapon did during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeaponTick {
    pub entered: Option<WeaponStage>,
    /// A burst pulse is due this tick
    pub pulse: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub phase: WeaponPhase,
    /// Nearest alive tank, followed by the body
    pub target: Option<TankId>,
    /// Every alive tank, aimed at by the burst
    pub targets: Vec<TankId>,
    /// Degrees toward the movement target
    pub facing: f32,
}

impl Boss {
    pub fn new(pos: Vec2, rules: &JuggernautRules) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: rules.size / 2.0,
            phase: WeaponPhase::Idle { elapsed: 0.0 },
            target: None,
            targets: Vec::new(),
            facing: 0.0,
        }
    }

    pub fn stage(&self) -> WeaponStage {
        self.phase.stage()
    }

    pub fn view(&self) -> BossView {
        BossView {
            position: self.pos,
            radius: self.radius,
            stage: self.stage(),
            facing: self.facing,
        }
    }

    /// Re-target and creep toward the nearest alive tank
    pub fn seek(&mut self, tanks: &[Tank], dt: f32, rules: &JuggernautRules, bounds: &ArenaBounds) {
        self.targets = tanks.iter().filter(|t| t.alive).map(|t| t.id).collect();

        // Ties go to the lowest id
        let nearest = tanks
            .iter()
            .filter(|t| t.alive)
            .map(|t| (t, self.pos.distance(t.pos)))
            .fold(None::<(&Tank, f32)>, |best, (t, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((t, d)),
            });

        self.target = nearest.map(|(t, _)| t.id);
        match nearest {
            Some((tank, _)) => {
                let dir = push_direction(self.pos, tank.pos);
                self.vel = dir * rules.speed;
                self.pos += self.vel * dt;
                self.facing = heading_degrees(self.pos, tank.pos);
            }
            None => self.vel = Vec2::ZERO,
        }

        let r = self.radius;
        self.pos.x = self.pos.x.clamp(r.min(bounds.width / 2.0), (bounds.width - r).max(bounds.width / 2.0));
        self.pos.y = self
            .pos
            .y
            .clamp(r.min(bounds.height / 2.0), (bounds.height - r).max(bounds.height / 2.0));
    }

    /// Advance the weapon cycle by one tick
    ///
    /// At most one transition per tick, each resetting the phase timer.
    pub fn advance_weapon(&mut self, dt: f32, rules: &JuggernautRules) -> WeaponTick {
        let mut tick = WeaponTick::default();

        self.phase = match self.phase {
            WeaponPhase::Idle { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= rules.idle_time {
                    tick.entered = Some(WeaponStage::Charge);
                    WeaponPhase::Charge { elapsed: 0.0 }
                } else {
                    WeaponPhase::Idle { elapsed }
                }
            }
            WeaponPhase::Charge { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= rules.charge_time {
                    tick.entered = Some(WeaponStage::Burst);
                    WeaponPhase::Burst {
                        elapsed: 0.0,
                        shots_fired: 0,
                        cooldown: 0.0,
                    }
                } else {
                    WeaponPhase::Charge { elapsed }
                }
            }
            WeaponPhase::Burst {
                elapsed,
                mut shots_fired,
                mut cooldown,
            } => {
                cooldown -= dt;
                if cooldown <= 0.0 && shots_fired < rules.burst_count {
                    tick.pulse = true;
                    shots_fired += 1;
                    cooldown = rules.burst_interval;
                }
                if shots_fired >= rules.burst_count {
                    tick.entered = Some(WeaponStage::Idle);
                    WeaponPhase::Idle { elapsed: 0.0 }
                } else {
                    WeaponPhase::Burst {
                        elapsed: elapsed + dt,
                        shots_fired,
                        cooldown,
                    }
                }
            }
        };

        tick
    }

    /// One heavy shot per alive tank, each aimed at that tank's position now
    pub fn pulse(&self, tanks: &[Tank], rules: &JuggernautRules) -> Vec<(Projectile, f32)> {
        tanks
            .iter()
            .filter(|t| t.alive)
            .map(|target| {
                let angle = heading_degrees(self.pos, target.pos);
                let dir = push_direction(self.pos, target.pos);
                let shot = Projectile {
                    id: 0,
                    pos: self.pos + dir * (self.radius + rules.muzzle_gap),
                    vel: dir * rules.shot_speed,
                    owner: Shooter::Boss,
                    damage: rules.shot_damage,
                    critical: false,
                    knockback: rules.shot_knockback,
                    half_extent: rules.shot_half_extent,
                    alive: true,
                };
                (shot, angle)
            })
            .collect()
    }

    /// Body contact with a tank hull
    pub fn touches(&self, tank: &Tank) -> bool {
        within_radius(self.pos, self.radius + tank.size / 2.0, tank.pos)
    }
}

#[derive(Debug, Clone)]
pub struct Juggernaut {
    pub boss: Boss,
}

impl Juggernaut {
    pub fn setup(world: &mut World, rules: &JuggernautRules) -> Self {
        for tank in &mut world.tanks {
            tank.max_health *= rules.tank_health_multiplier;
            tank.health = tank.max_health;
        }
        let boss = Boss::new(world.center(), rules);
        log::debug!("Juggernaut spawned at ({:.0}, {:.0})", boss.pos.x, boss.pos.y);
        Self { boss }
    }

    pub fn update(
        &mut self,
        world: &mut World,
        rules: &JuggernautRules,
        tank: &TankTuning,
        dt: f32,
    ) -> Option<Outcome> {
        self.boss.seek(&world.tanks, dt, rules, &world.bounds);

        let tick = self.boss.advance_weapon(dt, rules);
        if let Some(stage) = tick.entered {
            log::debug!("Juggernaut weapon → {stage:?}");
            world.emit(GameEvent::BossPhaseChanged { stage });
        }
        if tick.pulse {
            for (shot, angle) in self.boss.pulse(&world.tanks, rules) {
                world.launch(shot, angle);
            }
        }

        for i in 0..world.tanks.len() {
            if world.tanks[i].alive && self.boss.touches(&world.tanks[i]) {
                let away = push_direction(self.boss.pos, world.tanks[i].pos);
                world.tanks[i].knock(away, rules.melee_knockback, tank.knockback_scale);
                world.hurt(i, rules.melee_dps * dt);
            }
        }

        match world.alive_ids().as_slice() {
            [] => Some(Outcome::Draw),
            [winner] => Some(Outcome::Champion(*winner)),
            _ => None,
        }
    }
}
