//! Maze deathmatch with a closing zone and orbital hazards
//!
//! The zone margin only ever grows. Hazards run Warning → Active → Dead on
//! their own timers; only Active hazards hurt, once per blast sub-interval.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::{ArenaBounds, LabyrinthRules, TankTuning};
use crate::sim::collision::{push_direction, within_radius};
use crate::sim::state::{GameEvent, HazardStage, Outcome, Wall, World};

/// Closing border band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkingZone {
    /// Current band width from every edge
    pub margin: f32,
    /// Width the band is easing toward
    pub target: f32,
    timer: f32,
}

impl Default for ShrinkingZone {
    fn default() -> Self {
        Self {
            margin: 0.0,
            target: 0.0,
            timer: 0.0,
        }
    }
}

impl ShrinkingZone {
    pub fn update(&mut self, dt: f32, rules: &LabyrinthRules, bounds: &ArenaBounds) {
        let cap = bounds.width.min(bounds.height) / 2.0;

        self.timer += dt;
        if self.timer >= rules.shrink_interval {
            self.timer = 0.0;
            self.target = (self.target + rules.shrink_step).min(cap);
            log::debug!("Zone closing to {:.0}", self.target);
        }

        if self.margin < self.target {
            let t = (rules.shrink_smoothing * dt).min(1.0);
            let next = self.margin + (self.target - self.margin) * t;
            self.margin = next.clamp(self.margin, self.target);
        }
    }

    /// True if `pos` lies strictly inside the damaging band
    pub fn contains(&self, pos: Vec2, bounds: &ArenaBounds) -> bool {
        pos.x < self.margin
            || pos.x > bounds.width - self.margin
            || pos.y < self.margin
            || pos.y > bounds.height - self.margin
    }
}

/// Hazard lifecycle with per-phase timers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardPhase {
    Warning { elapsed: f32 },
    Active { elapsed: f32, since_blast: f32 },
    Dead,
}

/// What one hazard did during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HazardTick {
    pub entered: Option<HazardStage>,
    pub blast: bool,
}

/// Orbital strike zone
#[derive(Debug, Clone, PartialEq)]
pub struct HazardZone {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub phase: HazardPhase,
}

impl HazardZone {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            phase: HazardPhase::Warning { elapsed: 0.0 },
        }
    }

    pub fn stage(&self) -> HazardStage {
        match self.phase {
            HazardPhase::Warning { .. } => HazardStage::Warning,
            HazardPhase::Active { .. } => HazardStage::Active,
            HazardPhase::Dead => HazardStage::Dead,
        }
    }

    /// Advance the phase timers; transitions reset the timer to zero
    pub fn advance(&mut self, dt: f32, rules: &LabyrinthRules) -> HazardTick {
        let mut tick = HazardTick::default();

        self.phase = match self.phase {
            HazardPhase::Warning { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= rules.hazard_warning {
                    tick.entered = Some(HazardStage::Active);
                    HazardPhase::Active {
                        elapsed: 0.0,
                        since_blast: 0.0,
                    }
                } else {
                    HazardPhase::Warning { elapsed }
                }
            }
            HazardPhase::Active {
                elapsed,
                since_blast,
            } => {
                let elapsed = elapsed + dt;
                let mut since_blast = since_blast + dt;
                if since_blast >= rules.hazard_blast_interval {
                    since_blast = 0.0;
                    tick.blast = true;
                }
                if elapsed >= rules.hazard_active {
                    tick.entered = Some(HazardStage::Dead);
                    HazardPhase::Dead
                } else {
                    HazardPhase::Active {
                        elapsed,
                        since_blast,
                    }
                }
            }
            HazardPhase::Dead => HazardPhase::Dead,
        };

        tick
    }

    /// Damaging contact: only while active, strictly inside the radius
    pub fn hits(&self, pos: Vec2) -> bool {
        self.stage() == HazardStage::Active && within_radius(self.pos, self.radius, pos)
    }
}

#[derive(Debug, Clone)]
pub struct Labyrinth {
    pub zone: ShrinkingZone,
    pub hazards: Vec<HazardZone>,
    hazard_timer: f32,
}

impl Labyrinth {
    pub fn setup(world: &mut World, rules: &LabyrinthRules) -> Self {
        world.walls = maze(&world.bounds);
        log::debug!(
            "Labyrinth: {} walls, zone step {:.0} every {:.0}s",
            world.walls.len(),
            rules.shrink_step,
            rules.shrink_interval
        );
        Self {
            zone: ShrinkingZone::default(),
            hazards: Vec::new(),
            hazard_timer: 0.0,
        }
    }

    pub fn update(
        &mut self,
        world: &mut World,
        rules: &LabyrinthRules,
        tank: &TankTuning,
        dt: f32,
    ) -> Option<Outcome> {
        // Band damage uses the margin in effect during this tick
        for i in 0..world.tanks.len() {
            let t = &world.tanks[i];
            if t.alive && self.zone.contains(t.pos, &world.bounds) {
                world.hurt(i, rules.zone_dps * dt);
            }
        }
        self.zone.update(dt, rules, &world.bounds);

        self.hazard_timer += dt;
        if self.hazard_timer >= rules.hazard_interval {
            self.hazard_timer = 0.0;
            self.spawn_hazard(world, rules);
        }

        for hazard in &mut self.hazards {
            let tick = hazard.advance(dt, rules);

            if tick.blast {
                let angle = world.rng.random_range(0.0..TAU);
                let dist = world.rng.random_range(0.0..=hazard.radius * 0.8);
                world.emit(GameEvent::HazardBlast {
                    hazard: hazard.id,
                    position: hazard.pos + Vec2::new(angle.cos(), angle.sin()) * dist,
                });

                for i in 0..world.tanks.len() {
                    let pos = world.tanks[i].pos;
                    if world.tanks[i].alive && within_radius(hazard.pos, hazard.radius, pos) {
                        // Knock first so a killing blast leaves the wreck at rest
                        world.tanks[i].knock(
                            push_direction(hazard.pos, pos),
                            rules.hazard_knockback,
                            tank.knockback_scale,
                        );
                        world.hurt(i, rules.hazard_damage);
                    }
                }
            }

            if let Some(stage) = tick.entered {
                log::debug!("Hazard {} → {:?}", hazard.id, stage);
                world.emit(GameEvent::HazardPhaseChanged {
                    hazard: hazard.id,
                    position: hazard.pos,
                    stage,
                });
            }
        }
        self.hazards.retain(|h| h.stage() != HazardStage::Dead);

        if world.alive_count() <= rules.survivors {
            return Some(Outcome::Survivors(world.alive_ids()));
        }
        None
    }

    /// Place a hazard fully on screen, preferring spots clear of spawn points
    fn spawn_hazard(&mut self, world: &mut World, rules: &LabyrinthRules) {
        let margin = rules.hazard_radius + 50.0;
        let (w, h) = (world.bounds.width, world.bounds.height);

        let mut pos = world.center();
        if margin <= w - margin && margin <= h - margin {
            for _ in 0..rules.hazard_attempts.max(1) {
                pos = Vec2::new(
                    world.rng.random_range(margin..=w - margin),
                    world.rng.random_range(margin..=h - margin),
                );
                let clear = world
                    .tanks
                    .iter()
                    .all(|t| t.spawn_point.distance(pos) >= rules.hazard_radius);
                if clear {
                    break;
                }
            }
        }

        let id = world.next_entity_id();
        log::debug!("Hazard {id} warning at ({:.0}, {:.0})", pos.x, pos.y);
        world.emit(GameEvent::HazardPhaseChanged {
            hazard: id,
            position: pos,
            stage: HazardStage::Warning,
        });
        self.hazards.push(HazardZone::new(id, pos, rules.hazard_radius));
    }
}

/// Fixed symmetric maze scaled from the arena size
pub fn maze(bounds: &ArenaBounds) -> Vec<Wall> {
    let (w, h) = (bounds.width, bounds.height);
    vec![
        Wall::new(200.0, 150.0, 20.0, 200.0),
        Wall::new(w - 220.0, 150.0, 20.0, 200.0),
        Wall::new(200.0, h - 350.0, 20.0, 200.0),
        Wall::new(w - 220.0, h - 350.0, 20.0, 200.0),
        Wall::new(400.0, 300.0, 200.0, 20.0),
        Wall::new(w - 600.0, 300.0, 200.0, 20.0),
        Wall::new(400.0, h - 320.0, 200.0, 20.0),
        Wall::new(w - 600.0, h - 320.0, 200.0, 20.0),
        Wall::new(w / 2.0 - 10.0, 100.0, 20.0, 150.0),
        Wall::new(w / 2.0 - 10.0, h - 250.0, 20.0, 150.0),
    ]
}
