//! Fixed timestep simulation tick
//!
//! One tick runs five phases in a fixed order: projectiles advance and
//! collide, every alive tank decides once, tanks integrate, the ruleset
//! updates and checks its end condition, and the tick's events are
//! released. Nothing else mutates the world.

use super::action::Action;
use super::collision::{hits_any_wall, push_direction};
use super::context::build_context;
use super::modes::ModeController;
use super::session::GameSession;
use super::state::{ActionOutcome, FaultKind, GameEvent, ModeKind, Shooter, World};
use super::tank::Drive;
use crate::config::ArenaConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sandbox::{Sandbox, Verdict};

/// Longest frame the clock will account for (avoids a catch-up burst)
const MAX_FRAME: f32 = 0.1;

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, dt: f32) {
    if session.outcome.is_some() {
        return;
    }

    let GameSession {
        config,
        world,
        controller,
        sandboxes,
        outbox,
        outcome,
        ..
    } = session;

    advance_projectiles(world, config, dt);
    run_decisions(world, controller, sandboxes, config);

    for tank in world.tanks.iter_mut().filter(|t| t.alive) {
        tank.integrate(dt, &config.tank, &world.bounds, &world.walls);
    }

    if let Some(result) = controller.update(world, config, dt) {
        log::info!("{} ended: {result:?}", world.mode.as_str());
        world.emit(GameEvent::ModeEnded {
            mode: world.mode,
            outcome: result.clone(),
        });
        *outcome = Some(result);
    }

    world.sweep();
    world.normalize_order();
    world.elapsed += dt;
    world.ticks += 1;

    outbox.extend(world.take_pending());
}

/// Phase 1: move projectiles, then walls before tanks
fn advance_projectiles(world: &mut World, config: &ArenaConfig, dt: f32) {
    let bounds = world.bounds;
    let scale = config.tank.knockback_scale;

    for i in 0..world.projectiles.len() {
        let projectile = &mut world.projectiles[i];
        if !projectile.alive {
            continue;
        }
        projectile.advance(dt, &bounds);
        if !projectile.alive {
            continue;
        }

        let rect = projectile.rect();
        if hits_any_wall(&rect, &world.walls) {
            projectile.alive = false;
            continue;
        }

        let owner = projectile.owner;
        let Some(index) = world
            .tanks
            .iter()
            .position(|t| t.alive && owner != Shooter::Tank(t.id) && t.rect().overlaps(&rect))
        else {
            continue;
        };

        projectile.alive = false;
        let (origin, damage, knockback) = (projectile.pos, projectile.damage, projectile.knockback);
        let direction = push_direction(origin, world.tanks[index].pos);

        if world.mode == ModeKind::Scramble {
            world.tanks[index].knock(direction, config.scramble.knockback, scale);
        } else {
            if knockback > 0.0 {
                world.tanks[index].knock(direction, knockback, scale);
            }
            world.hurt(index, damage);
        }
    }
}

/// Phase 2: one decision per alive tank, all from the same world state,
/// then applied in id order
fn run_decisions(
    world: &mut World,
    controller: &ModeController,
    sandboxes: &mut [Sandbox],
    config: &ArenaConfig,
) {
    let boss = controller.boss_view();
    let time_left = controller.time_left();
    let budget = config.sandbox.budget();

    let mut verdicts = Vec::with_capacity(world.tanks.len());
    for (index, tank) in world.tanks.iter().enumerate() {
        if !tank.alive {
            continue;
        }
        let Some(sandbox) = sandboxes.get_mut(index) else {
            continue;
        };
        let Some(ctx) = build_context(world, tank.id, boss, time_left, &config.sandbox) else {
            continue;
        };
        verdicts.push((index, sandbox.decide(&ctx, budget)));
    }

    for (index, verdict) in verdicts {
        let id = world.tanks[index].id;
        let outcome = match verdict {
            Verdict::Act(action) => {
                apply_action(world, index, action, config);
                ActionOutcome::Applied
            }
            Verdict::Idle | Verdict::Disabled => ActionOutcome::None,
            Verdict::Fault(fault) => {
                world.emit(GameEvent::DecisionFault {
                    tank: id,
                    kind: FaultKind::Runtime,
                    message: fault.to_string(),
                });
                ActionOutcome::None
            }
            Verdict::Lag(elapsed) => {
                world.emit(GameEvent::DecisionFault {
                    tank: id,
                    kind: FaultKind::Timeout,
                    message: format!("took {elapsed:?} of a {budget:?} budget"),
                });
                ActionOutcome::TimedOut
            }
        };
        world.tanks[index].last_outcome = outcome;
    }
}

/// Movement first (jam roll), then the shot (crit roll)
fn apply_action(world: &mut World, index: usize, action: Action, config: &ArenaConfig) {
    if action == Action::Stop {
        world.tanks[index].stop();
        return;
    }

    if let Some(input) = action.movement() {
        let tank = &mut world.tanks[index];
        if tank.drive(input, &config.tank, &mut world.rng) == Drive::Jammed {
            log::debug!("Tank {} jammed", tank.id);
        }
    }

    if let Some(angle) = action.aim() {
        let shot = world.tanks[index].fire(angle, &config.tank, &config.projectile, &mut world.rng);
        if let Some(projectile) = shot {
            world.launch(projectile, angle);
        }
    }
}

/// Turns variable frame times into a whole number of fixed ticks
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    step: f32,
    accumulator: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FrameClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
        }
    }

    /// Add a frame's elapsed time; returns how many ticks to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}
