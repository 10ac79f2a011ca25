//! Coin collection against the clock
//!
//! Bullets only shove in this ruleset. A timed spawner keeps up to
//! `max_coins` on the field, away from the tanks; the session ends when the
//! clock runs out and the coin standings decide who advances.

use glam::Vec2;
use rand::Rng;

use crate::config::ScrambleRules;
use crate::sim::geometry::Aabb;
use crate::sim::state::{Coin, GameEvent, Outcome, TankId, World};
use crate::standings::Standings;

#[derive(Debug, Clone)]
pub struct Scramble {
    /// Seconds on the session clock
    pub time_left: f32,
    spawn_timer: f32,
    /// Top of the standings as of the previous tick
    leaders: Vec<TankId>,
}

impl Scramble {
    pub fn setup(world: &mut World, rules: &ScrambleRules) -> Self {
        let leaders = Standings::from_tanks(&world.tanks).leaders(rules.advancing);
        log::debug!(
            "Scramble: {:.0}s on the clock, up to {} coins",
            rules.duration,
            rules.max_coins
        );
        Self {
            time_left: rules.duration,
            spawn_timer: 0.0,
            leaders,
        }
    }

    pub fn update(&mut self, world: &mut World, rules: &ScrambleRules, dt: f32) -> Option<Outcome> {
        self.time_left = (self.time_left - dt).max(0.0);

        self.spawn_timer += dt;
        if self.spawn_timer >= rules.coin_spawn_interval {
            self.spawn_timer = 0.0;
            spawn_coin(world, rules);
        }

        collect_coins(world, rules);

        let standings = Standings::from_tanks(&world.tanks);
        let leaders = standings.leaders(rules.advancing);
        if leaders != self.leaders {
            world.emit(GameEvent::StandingsChanged {
                leaders: leaders.clone(),
            });
            self.leaders = leaders;
        }

        if self.time_left <= 0.0 {
            let advancing = standings.leaders(rules.advancing);
            return Some(Outcome::Ranked {
                standings,
                advancing,
            });
        }
        None
    }
}

/// Try a bounded number of random spots clear of every tank and spawn point
fn spawn_coin(world: &mut World, rules: &ScrambleRules) {
    if world.coins.len() >= rules.max_coins {
        return;
    }

    let inset = rules.spawn_inset;
    let (max_x, max_y) = (world.bounds.width - inset, world.bounds.height - inset);
    if inset > max_x || inset > max_y {
        return;
    }

    for _ in 0..rules.spawn_attempts {
        let candidate = Vec2::new(
            world.rng.random_range(inset..=max_x),
            world.rng.random_range(inset..=max_y),
        );
        let clear = world.tanks.iter().all(|t| {
            t.pos.distance(candidate) >= rules.spawn_clearance
                && t.spawn_point.distance(candidate) >= rules.spawn_clearance
        });
        if clear {
            let id = world.next_entity_id();
            log::debug!("Coin {id} spawned at ({:.0}, {:.0})", candidate.x, candidate.y);
            world.coins.push(Coin {
                id,
                pos: candidate,
                collected: false,
            });
            return;
        }
    }
}

/// Award each live coin to the first alive tank (id order) overlapping it
fn collect_coins(world: &mut World, rules: &ScrambleRules) {
    let half = rules.coin_size / 2.0;
    let mut collected = Vec::new();

    for coin in world.coins.iter_mut().filter(|c| !c.collected) {
        let rect = Aabb::around(coin.pos, half);
        if let Some(tank) = world
            .tanks
            .iter_mut()
            .find(|t| t.alive && t.rect().overlaps(&rect))
        {
            coin.collected = true;
            tank.coins += rules.coin_value;
            collected.push((tank.id, coin.id));
        }
    }

    for (tank, coin) in collected {
        world.emit(GameEvent::CoinCollected { tank, coin });
    }
    world.coins.retain(|c| !c.collected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, TankTuning};
    use crate::sim::state::ModeKind;
    use crate::sim::tank::Tank;

    fn world_with(positions: &[Vec2]) -> World {
        let mut world = World::new(ModeKind::Scramble, &ArenaConfig::default());
        for (i, &p) in positions.iter().enumerate() {
            world
                .tanks
                .push(Tank::new(i as TankId, format!("t{i}"), p, 0.0, &TankTuning::default()));
        }
        world
    }

    fn coin_at(world: &mut World, pos: Vec2) {
        let id = world.next_entity_id();
        world.coins.push(Coin {
            id,
            pos,
            collected: false,
        });
    }

    #[test]
    fn test_pickup_awards_first_tank_only() {
        let mut world = world_with(&[Vec2::new(300.0, 300.0), Vec2::new(310.0, 300.0)]);
        coin_at(&mut world, Vec2::new(305.0, 300.0));
        let rules = ScrambleRules {
            coin_spawn_interval: 1000.0,
            ..ScrambleRules::default()
        };
        let mut scramble = Scramble::setup(&mut world, &rules);

        scramble.update(&mut world, &rules, 1.0 / 60.0);
        assert_eq!(world.tanks[0].coins, 1);
        assert_eq!(world.tanks[1].coins, 0);
        assert!(world.coins.is_empty());

        let events = world.take_pending();
        assert!(events.contains(&GameEvent::CoinCollected { tank: 0, coin: 1 }));
    }

    #[test]
    fn test_dead_tanks_do_not_collect() {
        let mut world = world_with(&[Vec2::new(300.0, 300.0)]);
        world.tanks[0].alive = false;
        coin_at(&mut world, Vec2::new(300.0, 300.0));
        let rules = ScrambleRules::default();
        let mut scramble = Scramble::setup(&mut world, &rules);
        scramble.update(&mut world, &rules, 1.0 / 60.0);
        assert_eq!(world.tanks[0].coins, 0);
    }

    #[test]
    fn test_spawner_respects_cap_and_clearance() {
        let mut world = world_with(&[Vec2::new(640.0, 360.0), Vec2::new(200.0, 200.0)]);
        let rules = ScrambleRules {
            coin_spawn_interval: 0.0,
            max_coins: 5,
            ..ScrambleRules::default()
        };
        let mut scramble = Scramble::setup(&mut world, &rules);
        for _ in 0..200 {
            scramble.update(&mut world, &rules, 1.0 / 60.0);
        }
        assert!(world.coins.len() <= 5);
        assert!(!world.coins.is_empty());
        for coin in &world.coins {
            for tank in &world.tanks {
                assert!(coin.pos.distance(tank.pos) >= rules.spawn_clearance);
            }
        }
    }

    #[test]
    fn test_coins_avoid_spawn_points() {
        let mut world = world_with(&[Vec2::new(640.0, 360.0), Vec2::new(300.0, 200.0)]);
        // Both tanks have wandered off their spawn points
        world.tanks[0].pos = Vec2::new(100.0, 100.0);
        world.tanks[1].pos = Vec2::new(1180.0, 620.0);
        let rules = ScrambleRules {
            coin_spawn_interval: 0.0,
            max_coins: 20,
            ..ScrambleRules::default()
        };
        let mut scramble = Scramble::setup(&mut world, &rules);
        for _ in 0..100 {
            scramble.update(&mut world, &rules, 1.0 / 60.0);
        }

        assert!(world.coins.len() > 5);
        for coin in &world.coins {
            for tank in &world.tanks {
                assert!(coin.pos.distance(tank.spawn_point) >= rules.spawn_clearance);
                assert!(coin.pos.distance(tank.pos) >= rules.spawn_clearance);
            }
        }
    }

    #[test]
    fn test_leader_change_emits_once() {
        let mut world = world_with(&[Vec2::new(300.0, 300.0), Vec2::new(900.0, 300.0)]);
        let rules = ScrambleRules {
            coin_spawn_interval: 1000.0,
            advancing: 1,
            ..ScrambleRules::default()
        };
        let mut scramble = Scramble::setup(&mut world, &rules);

        coin_at(&mut world, Vec2::new(900.0, 300.0));
        scramble.update(&mut world, &rules, 1.0 / 60.0);
        scramble.update(&mut world, &rules, 1.0 / 60.0);

        let changes: Vec<_> = world
            .take_pending()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::StandingsChanged { .. }))
            .collect();
        assert_eq!(changes, vec![GameEvent::StandingsChanged { leaders: vec![1] }]);
    }

    #[test]
    fn test_clock_ends_with_ranking() {
        let mut world = world_with(&[Vec2::new(300.0, 300.0), Vec2::new(900.0, 300.0)]);
        world.tanks[1].coins = 3;
        let rules = ScrambleRules {
            duration: 0.04,
            coin_spawn_interval: 1000.0,
            advancing: 1,
            ..ScrambleRules::default()
        };
        let mut scramble = Scramble::setup(&mut world, &rules);
        assert!(scramble.update(&mut world, &rules, 1.0 / 60.0).is_none());
        assert!(scramble.update(&mut world, &rules, 1.0 / 60.0).is_none());
        match scramble.update(&mut world, &rules, 1.0 / 60.0) {
            Some(Outcome::Ranked { standings, advancing }) => {
                assert_eq!(advancing, vec![1]);
                assert_eq!(standings.rank_of(0), Some(2));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(scramble.time_left, 0.0);
    }
}
