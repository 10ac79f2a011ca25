//! Built-in bots and the name → loader roster
//!
//! - `idle`: never acts
//! - `wanderer`: wall-avoiding random walker that grabs coins and takes
//!   potshots with spread
//! - `hunter`: closes on the nearest enemy and fires, strafing when close,
//!   and keeps away from the boss

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::Value;

use crate::error::{DecisionFault, LoadFault};
use crate::sandbox::{Brain, Entrant};
use crate::sim::action::Action;
use crate::sim::context::Context;
use crate::sim::state::ModeKind;
use crate::{direction_from_degrees, heading_degrees};

/// Distance at which bots start running from the boss body
const BOSS_FEAR: f32 = 150.0;

pub struct Idle;

impl Brain for Idle {
    fn decide(&mut self, _ctx: &Context) -> Result<Value, DecisionFault> {
        Ok(Value::Null)
    }
}

pub struct Wanderer {
    rng: Pcg32,
}

impl Wanderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn random_heading(&mut self) -> Action {
        Action::Move(direction_from_degrees(self.rng.random_range(0.0..360.0)))
    }

    fn harass(&mut self, ctx: &Context, target: Vec2) -> Option<Action> {
        let me = ctx.me.position;
        if self.rng.random_bool(0.5) {
            return Some(Action::Move(target - me));
        }
        (ctx.me.ammo > 0).then(|| {
            let spread = self.rng.random_range(-10.0..10.0);
            Action::Shoot(heading_degrees(me, target) + spread)
        })
    }
}

impl Brain for Wanderer {
    fn decide(&mut self, ctx: &Context) -> Result<Value, DecisionFault> {
        if let Some(escape) = avoid_walls(ctx) {
            return Ok(escape.into_value());
        }

        let me = ctx.me.position;
        if let Some(boss) = &ctx.boss {
            if me.distance(boss.position) < boss.radius + BOSS_FEAR {
                return Ok(Action::Move(me - boss.position).into_value());
            }
        }

        let enemy = nearest(me, ctx.enemies.iter().map(|e| e.position));
        let action = if ctx.mode == ModeKind::Scramble {
            let roll: f32 = self.rng.random();
            let coin = nearest(me, ctx.coins.iter().map(|c| c.position));
            match (coin, enemy) {
                _ if roll < 0.4 => None,
                (Some(coin), _) if roll < 0.7 => Some(Action::Move(coin - me)),
                (_, Some(enemy)) => self.harass(ctx, enemy),
                _ => None,
            }
        } else {
            enemy.and_then(|enemy| self.harass(ctx, enemy))
        };

        Ok(action.unwrap_or_else(|| self.random_heading()).into_value())
    }
}

pub struct Hunter;

impl Brain for Hunter {
    fn decide(&mut self, ctx: &Context) -> Result<Value, DecisionFault> {
        if let Some(escape) = avoid_walls(ctx) {
            return Ok(escape.into_value());
        }

        let me = ctx.me.position;
        let enemy = nearest(me, ctx.enemies.iter().map(|e| e.position));

        if let Some(boss) = &ctx.boss {
            if me.distance(boss.position) < boss.radius + BOSS_FEAR {
                let aim = heading_degrees(me, enemy.unwrap_or(boss.position));
                return Ok(Action::MoveAndShoot(me - boss.position, aim).into_value());
            }
        }

        let action = match enemy {
            Some(target) => {
                let aim = heading_degrees(me, target);
                let toward = target - me;
                if ctx.mode == ModeKind::Scramble {
                    match nearest(me, ctx.coins.iter().map(|c| c.position)) {
                        Some(coin) => Action::MoveAndShoot(coin - me, aim),
                        None => Action::MoveAndShoot(toward, aim),
                    }
                } else if toward.length() > 200.0 {
                    Action::MoveAndShoot(toward, aim)
                } else {
                    // Circle the target
                    Action::MoveAndShoot(toward.perp(), aim)
                }
            }
            None => match nearest(me, ctx.coins.iter().map(|c| c.position)) {
                Some(coin) => Action::Move(coin - me),
                None => Action::Stop,
            },
        };

        Ok(action.into_value())
    }
}

/// Whisker reflexes shared by the moving bots
fn avoid_walls(ctx: &Context) -> Option<Action> {
    let sensors = ctx.sensors;
    let facing = ctx.me.facing;

    let turn = if sensors.front < 10.0 {
        180.0
    } else if sensors.front < 50.0 {
        if sensors.left > sensors.right { -90.0 } else { 90.0 }
    } else if sensors.left < 30.0 {
        45.0
    } else if sensors.right < 30.0 {
        -45.0
    } else {
        return None;
    };

    Some(Action::Move(direction_from_degrees(facing + turn)))
}

fn nearest(from: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}

type Factory = Arc<dyn Fn(u64) -> Box<dyn Brain> + Send + Sync>;

/// Named bot factories
#[derive(Clone)]
pub struct Roster {
    factories: BTreeMap<String, Factory>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Roster {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// `idle`, `wanderer` and `hunter`
    pub fn builtin() -> Self {
        let mut roster = Self::empty();
        roster.register("idle", |_| Box::new(Idle));
        roster.register("wanderer", |seed| Box::new(Wanderer::new(seed)));
        roster.register("hunter", |_| Box::new(Hunter));
        roster
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(u64) -> Box<dyn Brain> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a brain by name
    pub fn load(&self, name: &str, seed: u64) -> Result<Box<dyn Brain>, LoadFault> {
        self.factories
            .get(name)
            .map(|factory| factory(seed))
            .ok_or_else(|| LoadFault::MissingEntryPoint(name.to_string()))
    }

    /// An entrant whose loader resolves `bot` on every (re)load
    ///
    /// Unknown names are not rejected here; they surface as a load fault
    /// when the session loads the entrant.
    pub fn entrant(&self, team: impl Into<String>, bot: &str, seed: u64) -> Entrant {
        let roster = self.clone();
        let bot = bot.to_string();
        Entrant::new(team, move || roster.load(&bot, seed))
    }
}
