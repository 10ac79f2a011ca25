//! A single match: world, ruleset, one sandbox per entrant
//!
//! The session is the unit that gets reset. Tearing it down drops every
//! entity and decision module; rebuilding re-runs every loader, so load
//! faults only last until the next reset.

use super::modes::{ModeController, spawn_ring};
use super::state::{GameEvent, ModeKind, Outcome, TankId, World};
use super::tank::Tank;
use super::tick::tick;
use crate::config::ArenaConfig;
use crate::error::ConfigError;
use crate::sandbox::{Entrant, ExecutionMode, Sandbox};

pub struct GameSession {
    pub(crate) config: ArenaConfig,
    pub(crate) mode: ModeKind,
    pub(crate) entrants: Vec<Entrant>,
    pub(crate) execution: ExecutionMode,
    pub(crate) world: World,
    pub(crate) controller: ModeController,
    /// Indexed like `world.tanks` (tank id = entrant index)
    pub(crate) sandboxes: Vec<Sandbox>,
    /// Events released by finished ticks, oldest first
    pub(crate) outbox: Vec<GameEvent>,
    pub(crate) outcome: Option<Outcome>,
}

impl GameSession {
    /// Build a session with inline (deterministic) decision calls
    pub fn new(
        config: ArenaConfig,
        mode: ModeKind,
        entrants: Vec<Entrant>,
    ) -> Result<Self, ConfigError> {
        Self::with_execution(config, mode, entrants, ExecutionMode::Inline)
    }

    pub fn with_execution(
        config: ArenaConfig,
        mode: ModeKind,
        entrants: Vec<Entrant>,
        execution: ExecutionMode,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if entrants.is_empty() {
            return Err(ConfigError::NoEntrants);
        }
        if let Some(expected) = mode.fixed_entrants() {
            if entrants.len() != expected {
                return Err(ConfigError::EntrantCount {
                    mode: mode.as_str(),
                    expected,
                    got: entrants.len(),
                });
            }
        }

        let (world, controller, sandboxes) = populate(&config, mode, &entrants, execution);
        let mut session = Self {
            config,
            mode,
            entrants,
            execution,
            world,
            controller,
            sandboxes,
            outbox: Vec::new(),
            outcome: None,
        };
        session.flush_setup_events();

        log::info!(
            "{} session ready: {} tanks, seed {:#x}",
            mode.as_str(),
            session.entrants.len(),
            session.config.seed
        );
        Ok(session)
    }

    /// Tear down and rebuild every entity and decision module
    pub fn reset(&mut self) {
        let (world, controller, sandboxes) =
            populate(&self.config, self.mode, &self.entrants, self.execution);
        self.world = world;
        self.controller = controller;
        self.sandboxes = sandboxes;
        self.outbox.clear();
        self.outcome = None;
        self.flush_setup_events();
        log::info!("{} session reset", self.mode.as_str());
    }

    /// Advance one fixed tick
    pub fn step(&mut self) {
        let dt = self.config.tick_dt();
        tick(self, dt);
    }

    /// Step until the ruleset ends or `max_ticks` have run
    pub fn run(&mut self, max_ticks: u64) -> Option<&Outcome> {
        let mut ran = 0;
        while self.outcome.is_none() && ran < max_ticks {
            self.step();
            ran += 1;
        }
        self.outcome.as_ref()
    }

    /// Take every released event, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn mode(&self) -> ModeKind {
        self.mode
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.world.tank(id)
    }

    pub fn sandbox(&self, id: TankId) -> Option<&Sandbox> {
        self.sandboxes.get(id as usize)
    }

    pub fn time_left(&self) -> Option<f32> {
        self.controller.time_left()
    }

    fn flush_setup_events(&mut self) {
        let pending = self.world.take_pending();
        self.outbox.extend(pending);
    }
}

fn populate(
    config: &ArenaConfig,
    mode: ModeKind,
    entrants: &[Entrant],
    execution: ExecutionMode,
) -> (World, ModeController, Vec<Sandbox>) {
    let mut world = World::new(mode, config);

    let ring = spawn_ring(entrants.len(), &config.arena);
    for (id, (entrant, (pos, facing))) in entrants.iter().zip(ring).enumerate() {
        world
            .tanks
            .push(Tank::new(id as TankId, entrant.team.clone(), pos, facing, &config.tank));
    }

    let controller = ModeController::setup(&mut world, config);

    let mut sandboxes = Vec::with_capacity(entrants.len());
    for (id, entrant) in entrants.iter().enumerate() {
        let sandbox = Sandbox::load(&entrant.team, &entrant.loader, execution);
        if let Some(fault) = sandbox.load_fault() {
            world.emit(GameEvent::load_fault(id as TankId, fault));
        }
        sandboxes.push(sandbox);
    }

    (world, controller, sandboxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::Roster;
    use crate::sim::state::{Coin, FaultKind};
    use glam::Vec2;

    fn idlers(n: usize) -> Vec<Entrant> {
        let roster = Roster::builtin();
        (0..n)
            .map(|i| roster.entrant(format!("idle-{i}"), "idle", i as u64))
            .collect()
    }

    #[test]
    fn test_rejects_bad_setup() {
        let config = ArenaConfig::default();
        assert!(matches!(
            GameSession::new(config.clone(), ModeKind::Scramble, Vec::new()),
            Err(ConfigError::NoEntrants)
        ));

        let mut broken = config;
        broken.tick_rate = 0.0;
        assert!(matches!(
            GameSession::new(broken, ModeKind::Scramble, idlers(2)),
            Err(ConfigError::TickRate(_))
        ));
    }

    #[test]
    fn test_juggernaut_takes_exactly_two() {
        for n in [1, 3, 4] {
            let result = GameSession::new(ArenaConfig::default(), ModeKind::Juggernaut, idlers(n));
            assert!(matches!(
                result,
                Err(ConfigError::EntrantCount { expected: 2, got, .. }) if got == n
            ));
        }
        assert!(GameSession::new(ArenaConfig::default(), ModeKind::Juggernaut, idlers(2)).is_ok());
        assert!(GameSession::new(ArenaConfig::default(), ModeKind::Labyrinth, idlers(4)).is_ok());
    }

    #[test]
    fn test_tanks_follow_entrant_order() {
        let session = GameSession::new(ArenaConfig::default(), ModeKind::Labyrinth, idlers(3)).unwrap();
        let world = session.world();
        assert_eq!(world.tanks.len(), 3);
        for (i, tank) in world.tanks.iter().enumerate() {
            assert_eq!(tank.id, i as TankId);
            assert_eq!(tank.team, format!("idle-{i}"));
            assert_eq!(session.sandbox(tank.id).map(Sandbox::team), Some(tank.team.as_str()));
        }
    }

    #[test]
    fn test_load_fault_reported_at_setup() {
        let roster = Roster::builtin();
        let entrants = vec![
            roster.entrant("ok", "idle", 0),
            roster.entrant("missing", "no-such-bot", 0),
        ];
        let mut session = GameSession::new(ArenaConfig::default(), ModeKind::Labyrinth, entrants).unwrap();

        let events = session.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            GameEvent::DecisionFault { tank: 1, kind: FaultKind::Load, .. }
        ));
        assert!(session.sandbox(1).is_some_and(Sandbox::is_disabled));

        // The body still takes part in the world
        session.step();
        assert!(session.tank(1).is_some_and(|t| t.alive));
    }

    #[test]
    fn test_scramble_leader_ranks_first() {
        let mut config = ArenaConfig::default();
        config.scramble.duration = 30.0;
        config.scramble.coin_spawn_interval = 1000.0;
        let mut session = GameSession::new(config, ModeKind::Scramble, idlers(3)).unwrap();

        let home = session.world.tanks[0].pos;
        for _ in 0..5 {
            let id = session.world.next_entity_id();
            session.world.coins.push(Coin {
                id,
                pos: home,
                collected: false,
            });
        }

        let outcome = session.run(2_000).cloned();
        assert_eq!(session.tank(0).map(|t| t.coins), Some(5));
        assert_eq!(session.tank(1).map(|t| t.coins), Some(0));

        match outcome {
            Some(Outcome::Ranked { standings, advancing }) => {
                assert_eq!(standings.top().map(|e| e.tank), Some(0));
                assert_eq!(standings.rank_of(0), Some(1));
                assert_eq!(advancing.first(), Some(&0));
                assert_eq!(advancing.len(), 2);
            }
            other => panic!("expected a ranking, got {other:?}"),
        }

        let ended = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ModeEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_boss_melee_crowns_survivor() {
        let mut session = GameSession::new(ArenaConfig::default(), ModeKind::Juggernaut, idlers(2)).unwrap();
        let boss = session.controller().boss().map(|b| b.pos).unwrap();

        session.world.tanks[0].pos = boss;
        session.world.tanks[0].health = 1.0;
        session.step();

        assert_eq!(session.outcome(), Some(&Outcome::Champion(1)));
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::TankDestroyed { tank: 0, .. })));
        assert!(matches!(
            events.last(),
            Some(GameEvent::ModeEnded {
                mode: ModeKind::Juggernaut,
                outcome: Outcome::Champion(1)
            })
        ));

        // Finished sessions do not advance
        let ticks = session.world().ticks;
        session.step();
        assert_eq!(session.world().ticks, ticks);
    }

    #[test]
    fn test_reset_rebuilds_everything() {
        let roster = Roster::builtin();
        let entrants = vec![
            roster.entrant("a", "hunter", 0),
            roster.entrant("b", "no-such-bot", 0),
        ];
        let mut session = GameSession::new(ArenaConfig::default(), ModeKind::Labyrinth, entrants).unwrap();
        let start: Vec<Vec2> = session.world().tanks.iter().map(|t| t.pos).collect();

        session.run(120);
        assert!(session.world().ticks > 0);

        session.reset();
        assert_eq!(session.world().ticks, 0);
        assert!(session.outcome().is_none());
        let again: Vec<Vec2> = session.world().tanks.iter().map(|t| t.pos).collect();
        assert_eq!(start, again);
        assert!(session.world().tanks.iter().all(|t| t.health == t.max_health));

        // Load faults come back with the rebuilt sandboxes
        let events = session.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::DecisionFault { tank: 1, kind: FaultKind::Load, .. }]
        ));
    }

    #[test]
    fn test_worker_execution_drives_tanks() {
        let roster = Roster::builtin();
        let entrants = vec![roster.entrant("a", "hunter", 0), roster.entrant("b", "hunter", 1)];
        let mut config = ArenaConfig::default();
        config.labyrinth.survivors = 0;
        config.tank.jam_chance = 0.0;
        let mut session = GameSession::with_execution(
            config,
            ModeKind::Labyrinth,
            entrants,
            ExecutionMode::Worker,
        )
        .unwrap();
        let start = session.tank(0).map(|t| t.pos).unwrap();

        session.run(30);
        assert_eq!(session.world().ticks, 30);
        assert_eq!(session.execution(), ExecutionMode::Worker);
        assert_ne!(session.tank(0).map(|t| t.pos), Some(start));
    }
}
