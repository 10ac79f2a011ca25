//! Tank Arena headless runner
//!
//! Plays one session of each ruleset with the built-in bots and reports
//! how it went. `TANK_ARENA_SEED` overrides the default seed; `RUST_LOG`
//! controls verbosity.

use tank_arena::ArenaConfig;
use tank_arena::bots::Roster;
use tank_arena::sim::{GameEvent, GameSession, ModeKind, Outcome};
use tank_arena::standings::Standings;

/// Hard stop for rulesets without a clock (ten simulated minutes at 60 Hz)
const MAX_TICKS: u64 = 60 * 60 * 10;

#[derive(Default)]
struct Tally {
    shots: usize,
    crits: usize,
    deaths: usize,
    coins: usize,
    faults: usize,
    blasts: usize,
}

impl Tally {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ProjectileFired { critical, .. } => {
                self.shots += 1;
                if *critical {
                    self.crits += 1;
                }
            }
            GameEvent::TankDestroyed { tank, position } => {
                self.deaths += 1;
                log::info!("Tank {tank} destroyed at ({:.0}, {:.0})", position.x, position.y);
            }
            GameEvent::CoinCollected { .. } => self.coins += 1,
            GameEvent::StandingsChanged { leaders } => log::debug!("Leaders now {leaders:?}"),
            GameEvent::HazardPhaseChanged { hazard, stage, .. } => {
                log::debug!("Hazard {hazard} → {stage:?}")
            }
            GameEvent::HazardBlast { .. } => self.blasts += 1,
            GameEvent::BossPhaseChanged { stage } => log::trace!("Boss weapon → {stage:?}"),
            GameEvent::DecisionFault { tank, kind, message } => {
                self.faults += 1;
                log::debug!("Tank {tank} {kind:?} fault: {message}");
            }
            GameEvent::ModeEnded { mode, outcome } => {
                log::info!("{} finished: {outcome:?}", mode.as_str())
            }
        }
    }
}

fn lineup(mode: ModeKind) -> &'static [&'static str] {
    match mode {
        ModeKind::Scramble => &["hunter", "wanderer", "wanderer", "idle"],
        ModeKind::Labyrinth => &["hunter", "hunter", "wanderer", "wanderer"],
        ModeKind::Juggernaut => &["hunter", "wanderer"],
    }
}

fn play(config: &ArenaConfig, roster: &Roster, mode: ModeKind) {
    let entrants = lineup(mode)
        .iter()
        .enumerate()
        .map(|(i, bot)| roster.entrant(format!("{bot}-{i}"), bot, config.seed.wrapping_add(i as u64)))
        .collect();

    let mut session = match GameSession::new(config.clone(), mode, entrants) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not start {}: {e}", mode.as_str());
            return;
        }
    };

    let mut tally = Tally::default();
    while !session.is_over() && session.world().ticks < MAX_TICKS {
        session.step();
        for event in session.drain_events() {
            tally.record(&event);
        }
    }

    let world = session.world();
    println!("== {} ==", mode.as_str());
    println!(
        "{:.1}s simulated, {} shots ({} critical), {} destroyed, {} coins, {} blasts, {} faults",
        world.elapsed, tally.shots, tally.crits, tally.deaths, tally.coins, tally.blasts, tally.faults
    );

    match session.outcome() {
        Some(Outcome::Ranked { standings, advancing }) => {
            report_standings(standings);
            println!("advancing: {advancing:?}");
        }
        Some(Outcome::Survivors(ids)) => println!("survivors: {ids:?}"),
        Some(Outcome::Champion(id)) => println!("champion: tank {id}"),
        Some(Outcome::Draw) => println!("draw: nobody survived"),
        None => println!("no result after {MAX_TICKS} ticks"),
    }

    for tank in &world.tanks {
        println!(
            "  #{} {:<12} hp {:>6.0}/{:<6.0} ammo {:>4} {}",
            tank.id,
            tank.team,
            tank.health,
            tank.max_health,
            tank.ammo,
            if tank.alive { "" } else { "(destroyed)" }
        );
    }
    println!();
}

fn report_standings(standings: &Standings) {
    for (rank, entry) in standings.entries.iter().enumerate() {
        println!("  {}. tank {} ({}) {} coins", rank + 1, entry.tank, entry.team, entry.coins);
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::var("TANK_ARENA_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ArenaConfig::default().seed);
    let config = ArenaConfig::with_seed(seed);
    log::info!("Tank Arena (headless) seed {seed:#x}");

    let roster = Roster::builtin();
    for mode in [ModeKind::Scramble, ModeKind::Labyrinth, ModeKind::Juggernaut] {
        play(&config, &roster, mode);
    }
}
