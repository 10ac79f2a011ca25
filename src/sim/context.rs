//! Per-tank observation snapshot
//!
//! The snapshot is the only channel from the engine to decision logic. It is
//! built by value from the world: no references into live state survive, so
//! nothing a bot does to its copy can reach the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::sensors::{Sensors, sensor_readings};
use super::state::{ModeKind, Shooter, TankId, WeaponStage, World};
use crate::config::SandboxTuning;

/// The observing tank's own state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfView {
    pub id: TankId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: f32,
    pub health: f32,
    pub ammo: u32,
    pub coins: u32,
    pub jammed: bool,
    /// Seconds until the gun is ready again
    pub cooldown: f32,
}

/// An alive opponent: position and identity only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: TankId,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinView {
    pub position: Vec2,
}

/// Wall rectangle by top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallView {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub position: Vec2,
    pub radius: f32,
    pub stage: WeaponStage,
    /// Angle toward the current movement target, in degrees
    pub facing: f32,
}

/// Everything a decision may look at for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub me: SelfView,
    pub enemies: Vec<EnemyView>,
    /// Empty outside the coin ruleset
    pub coins: Vec<CoinView>,
    pub walls: Vec<WallView>,
    /// Opponent-owned projectiles only (boss shots included)
    pub projectiles: Vec<ProjectileView>,
    pub sensors: Sensors,
    pub boss: Option<BossView>,
    pub mode: ModeKind,
    /// Numeric mode id (1 scramble, 2 labyrinth, 3 juggernaut)
    pub mode_id: u8,
    /// Seconds left on the session clock; `None` for untimed rulesets
    pub time_left: Option<f32>,
}

/// Snapshot the world from one tank's point of view
///
/// Returns `None` for unknown tank ids.
pub fn build_context(
    world: &World,
    tank_id: TankId,
    boss: Option<BossView>,
    time_left: Option<f32>,
    tuning: &SandboxTuning,
) -> Option<Context> {
    let tank = world.tank(tank_id)?;

    let me = SelfView {
        id: tank.id,
        position: tank.pos,
        velocity: tank.vel,
        facing: tank.facing,
        health: tank.health,
        ammo: tank.ammo,
        coins: tank.coins,
        jammed: tank.jammed,
        cooldown: tank.shoot_cooldown,
    };

    let enemies = world
        .tanks
        .iter()
        .filter(|t| t.alive && t.id != tank_id)
        .map(|t| EnemyView {
            id: t.id,
            position: t.pos,
        })
        .collect();

    let coins = if world.mode == ModeKind::Scramble {
        world
            .coins
            .iter()
            .filter(|c| !c.collected)
            .map(|c| CoinView { position: c.pos })
            .collect()
    } else {
        Vec::new()
    };

    let walls = world
        .walls
        .iter()
        .map(|w| WallView {
            position: w.rect.min,
            width: w.rect.width(),
            height: w.rect.height(),
        })
        .collect();

    let projectiles = world
        .projectiles
        .iter()
        .filter(|p| p.alive && p.owner != Shooter::Tank(tank_id))
        .map(|p| ProjectileView {
            position: p.pos,
            velocity: p.vel,
        })
        .collect();

    let sensors = sensor_readings(
        tank.pos,
        tank.facing,
        &world.walls,
        tuning.sensor_range,
        tuning.sensor_spread,
    );

    Some(Context {
        me,
        enemies,
        coins,
        walls,
        projectiles,
        sensors,
        boss,
        mode: world.mode,
        mode_id: world.mode.id(),
        time_left,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, TankTuning};
    use crate::sim::state::{Coin, Projectile, Wall};
    use crate::sim::tank::Tank;

    fn shot(id: u32, owner: Shooter, pos: Vec2) -> Projectile {
        Projectile {
            id,
            pos,
            vel: Vec2::new(10.0, 0.0),
            owner,
            damage: 15.0,
            critical: false,
            knockback: 0.0,
            half_extent: 6.0,
            alive: true,
        }
    }

    fn world(mode: ModeKind) -> World {
        let config = ArenaConfig::default();
        let mut world = World::new(mode, &config);
        let tuning = TankTuning::default();
        for i in 0..3 {
            world.tanks.push(Tank::new(
                i,
                format!("bot{i}"),
                Vec2::new(100.0 + 200.0 * i as f32, 300.0),
                0.0,
                &tuning,
            ));
        }
        world.walls.push(Wall::new(500.0, 200.0, 40.0, 200.0));
        world.coins.push(Coin {
            id: 9,
            pos: Vec2::new(640.0, 100.0),
            collected: false,
        });
        world.projectiles.push(shot(1, Shooter::Tank(0), Vec2::new(50.0, 50.0)));
        world.projectiles.push(shot(2, Shooter::Tank(1), Vec2::new(60.0, 60.0)));
        world.projectiles.push(shot(3, Shooter::Boss, Vec2::new(70.0, 70.0)));
        world
    }

    #[test]
    fn test_own_projectiles_hidden() {
        let world = world(ModeKind::Labyrinth);
        let ctx = build_context(&world, 0, None, None, &SandboxTuning::default()).unwrap();
        assert_eq!(ctx.projectiles.len(), 2);
        assert!(ctx.projectiles.iter().all(|p| p.position != Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn test_dead_opponents_and_self_excluded() {
        let mut world = world(ModeKind::Labyrinth);
        world.tanks[2].alive = false;
        let ctx = build_context(&world, 1, None, None, &SandboxTuning::default()).unwrap();
        assert_eq!(ctx.enemies.len(), 1);
        assert_eq!(ctx.enemies[0].id, 0);
        assert_eq!(ctx.me.id, 1);
    }

    #[test]
    fn test_coins_only_in_scramble() {
        let scramble = world(ModeKind::Scramble);
        let ctx = build_context(&scramble, 0, None, Some(12.0), &SandboxTuning::default()).unwrap();
        assert_eq!(ctx.coins.len(), 1);
        assert_eq!(ctx.mode_id, 1);
        assert_eq!(ctx.time_left, Some(12.0));

        let labyrinth = world(ModeKind::Labyrinth);
        let ctx = build_context(&labyrinth, 0, None, None, &SandboxTuning::default()).unwrap();
        assert!(ctx.coins.is_empty());
        assert_eq!(ctx.walls.len(), 1);
        assert_eq!(ctx.walls[0].width, 40.0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut world = world(ModeKind::Scramble);
        let mut ctx = build_context(&world, 0, None, None, &SandboxTuning::default()).unwrap();
        ctx.me.health = -5.0;
        ctx.enemies.clear();
        assert_eq!(world.tanks[0].health, TankTuning::default().max_health);

        world.tanks[1].pos = Vec2::new(1.0, 1.0);
        let ctx2 = build_context(&world, 0, None, None, &SandboxTuning::default()).unwrap();
        assert_ne!(ctx2.enemies[0].position, ctx.me.position);
        assert_eq!(ctx2.enemies[0].position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_sensors_see_walls() {
        let world = world(ModeKind::Labyrinth);
        // Tank 1 at x=300 facing +x toward the wall at x=500
        let ctx = build_context(&world, 1, None, None, &SandboxTuning::default()).unwrap();
        assert!((ctx.sensors.front - 200.0).abs() < 0.11);
    }

    #[test]
    fn test_unknown_tank() {
        let world = world(ModeKind::Scramble);
        assert!(build_context(&world, 42, None, None, &SandboxTuning::default()).is_none());
    }
}
