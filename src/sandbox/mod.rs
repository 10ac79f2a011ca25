//! Fault-isolated, time-budgeted execution of bot logic
//!
//! A [`Brain`] sees only the [`Context`] snapshot it is handed and answers
//! with a raw JSON value. The sandbox turns that into a [`Verdict`]: a
//! validated action, a no-op, a fault or a lag. Nothing a brain does can
//! reach the world except through the returned action.

mod worker;

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::{DecisionFault, LoadFault};
use crate::sim::action::Action;
use crate::sim::context::Context;
use worker::Worker;

/// Per-tank decision logic
pub trait Brain: Send {
    /// Answer one snapshot with a raw action value
    ///
    /// `Value::Null` (or any shape that is not an action) means "do nothing".
    fn decide(&mut self, ctx: &Context) -> Result<Value, DecisionFault>;
}

/// Reusable factory for a brain; called again on every session reset
pub type BrainLoader = Arc<dyn Fn() -> Result<Box<dyn Brain>, LoadFault> + Send + Sync>;

/// One competitor: a team name and how to build its brain
#[derive(Clone)]
pub struct Entrant {
    pub team: String,
    pub loader: BrainLoader,
}

impl Entrant {
    pub fn new<F>(team: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Brain>, LoadFault> + Send + Sync + 'static,
    {
        Self {
            team: team.into(),
            loader: Arc::new(loader),
        }
    }
}

impl fmt::Debug for Entrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entrant").field("team", &self.team).finish_non_exhaustive()
    }
}

/// Where decision calls run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Synchronous call, classified by measured elapsed time (deterministic)
    #[default]
    Inline,
    /// One thread per tank; the loop waits at most the budget
    Worker,
}

/// Result of one decision call, as the tick loop sees it
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A validated action to apply this tick
    Act(Action),
    /// Nothing to apply (null or malformed output)
    Idle,
    /// The call failed; treated as no input
    Fault(DecisionFault),
    /// Over budget; any answer is discarded
    Lag(Duration),
    /// The brain never loaded; the tank gets no input this session
    Disabled,
}

/// Raw outcome of running a brain once
pub(crate) enum Exchange {
    Answered {
        result: Result<Value, DecisionFault>,
        elapsed: Duration,
    },
    Overran(Duration),
    Lost,
}

enum Engine {
    Inline(Box<dyn Brain>),
    Worker(Worker),
    Disabled(LoadFault),
}

pub struct Sandbox {
    team: String,
    engine: Engine,
    /// Whether a fault has already been logged for this bot
    reported: bool,
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = match &self.engine {
            Engine::Inline(_) => "inline",
            Engine::Worker(_) => "worker",
            Engine::Disabled(_) => "disabled",
        };
        f.debug_struct("Sandbox")
            .field("team", &self.team)
            .field("engine", &engine)
            .finish()
    }
}

impl Sandbox {
    /// Build the brain; a load fault disables this sandbox for the session
    pub fn load(team: &str, loader: &BrainLoader, mode: ExecutionMode) -> Self {
        let loaded = catch_unwind(AssertUnwindSafe(|| loader()))
            .unwrap_or_else(|payload| Err(LoadFault::Init(panic_message(payload.as_ref()))));

        let engine = match loaded.and_then(|brain| match mode {
            ExecutionMode::Inline => Ok(Engine::Inline(brain)),
            ExecutionMode::Worker => Worker::spawn(team, brain).map(Engine::Worker),
        }) {
            Ok(engine) => {
                log::debug!("Loaded bot `{team}` ({mode:?})");
                engine
            }
            Err(fault) => {
                log::warn!("Bot `{team}` disabled: {fault}");
                Engine::Disabled(fault)
            }
        };

        Self {
            team: team.to_string(),
            engine,
            reported: false,
        }
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn load_fault(&self) -> Option<&LoadFault> {
        match &self.engine {
            Engine::Disabled(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.load_fault().is_some()
    }

    /// Run one decision under the budget
    pub fn decide(&mut self, ctx: &Context, budget: Duration) -> Verdict {
        let exchange = match &mut self.engine {
            Engine::Disabled(_) => return Verdict::Disabled,
            Engine::Inline(brain) => {
                let start = Instant::now();
                let result = invoke(brain.as_mut(), ctx);
                Exchange::Answered {
                    result,
                    elapsed: start.elapsed(),
                }
            }
            Engine::Worker(worker) => worker.ask(ctx.clone(), budget),
        };

        match exchange {
            Exchange::Answered { elapsed, .. } | Exchange::Overran(elapsed) if elapsed > budget => {
                log::debug!("Bot `{}` lagged: {:?} over {:?}", self.team, elapsed, budget);
                Verdict::Lag(elapsed)
            }
            Exchange::Overran(elapsed) => Verdict::Lag(elapsed),
            Exchange::Answered { result: Ok(value), .. } => {
                Action::parse(value).map_or(Verdict::Idle, Verdict::Act)
            }
            Exchange::Answered { result: Err(fault), .. } => self.fault(fault),
            Exchange::Lost => self.fault(DecisionFault::WorkerLost),
        }
    }

    /// Log the first fault of this bot; later ones only at trace level
    fn fault(&mut self, fault: DecisionFault) -> Verdict {
        if self.reported {
            log::trace!("Bot `{}` fault (suppressed): {fault}", self.team);
        } else {
            log::warn!("Bot `{}` fault: {fault}", self.team);
            self.reported = true;
        }
        Verdict::Fault(fault)
    }
}

/// Call a brain, turning a panic into a runtime fault
pub(crate) fn invoke(brain: &mut dyn Brain, ctx: &Context) -> Result<Value, DecisionFault> {
    catch_unwind(AssertUnwindSafe(|| brain.decide(ctx)))
        .unwrap_or_else(|payload| Err(DecisionFault::Panic(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, TankTuning};
    use crate::sim::context::build_context;
    use crate::sim::state::{ModeKind, World};
    use crate::sim::tank::Tank;
    use glam::Vec2;
    use serde_json::json;
    use std::thread;

    #[derive(Clone)]
    struct Fixed(Value);
    impl Brain for Fixed {
        fn decide(&mut self, _ctx: &Context) -> Result<Value, DecisionFault> {
            Ok(self.0.clone())
        }
    }

    #[derive(Clone)]
    struct Slow(Duration);
    impl Brain for Slow {
        fn decide(&mut self, _ctx: &Context) -> Result<Value, DecisionFault> {
            thread::sleep(self.0);
            Ok(Action::Shoot(0.0).into_value())
        }
    }

    #[derive(Clone)]
    struct Panicky;
    impl Brain for Panicky {
        fn decide(&mut self, _ctx: &Context) -> Result<Value, DecisionFault> {
            panic!("index out of range");
        }
    }

    fn ctx() -> Context {
        let config = ArenaConfig::default();
        let mut world = World::new(ModeKind::Scramble, &config);
        world
            .tanks
            .push(Tank::new(0, "t0", Vec2::new(100.0, 100.0), 0.0, &TankTuning::default()));
        build_context(&world, 0, None, Some(30.0), &config.sandbox).unwrap()
    }

    fn loader<B: Brain + Clone + Sync + 'static>(brain: B) -> BrainLoader {
        Arc::new(move || -> Result<Box<dyn Brain>, LoadFault> { Ok(Box::new(brain.clone())) })
    }

    const BUDGET: Duration = Duration::from_millis(100);

    #[test]
    fn test_valid_action_is_applied() {
        let mut sandbox = Sandbox::load(
            "fixed",
            &loader(Fixed(json!({"action": "MOVE", "param": [1, 0]}))),
            ExecutionMode::Inline,
        );
        assert_eq!(sandbox.decide(&ctx(), BUDGET), Verdict::Act(Action::Move(Vec2::X)));
    }

    #[test]
    fn test_malformed_action_is_idle() {
        let mut sandbox = Sandbox::load(
            "garbage",
            &loader(Fixed(json!({"action": "TELEPORT"}))),
            ExecutionMode::Inline,
        );
        assert_eq!(sandbox.decide(&ctx(), BUDGET), Verdict::Idle);
    }

    #[test]
    fn test_panic_becomes_fault() {
        let mut sandbox = Sandbox::load("panicky", &loader(Panicky), ExecutionMode::Inline);
        let verdict = sandbox.decide(&ctx(), BUDGET);
        assert!(matches!(verdict, Verdict::Fault(DecisionFault::Panic(ref m)) if m.contains("index")));
        // Still callable next tick
        assert!(matches!(sandbox.decide(&ctx(), BUDGET), Verdict::Fault(_)));
        assert!(!sandbox.is_disabled());
    }

    #[test]
    fn test_overrun_is_lag_even_if_valid() {
        let mut sandbox = Sandbox::load(
            "slow",
            &loader(Slow(Duration::from_millis(150))),
            ExecutionMode::Inline,
        );
        match sandbox.decide(&ctx(), BUDGET) {
            Verdict::Lag(elapsed) => assert!(elapsed >= Duration::from_millis(150)),
            other => panic!("expected lag, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_overrun_returns_at_budget() {
        let mut sandbox = Sandbox::load(
            "slow-worker",
            &loader(Slow(Duration::from_millis(150))),
            ExecutionMode::Worker,
        );
        let start = Instant::now();
        let verdict = sandbox.decide(&ctx(), BUDGET);
        assert!(matches!(verdict, Verdict::Lag(_)));
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn test_worker_answers_within_budget() {
        let mut sandbox = Sandbox::load(
            "fixed-worker",
            &loader(Fixed(json!({"action": "STOP"}))),
            ExecutionMode::Worker,
        );
        assert_eq!(
            sandbox.decide(&ctx(), Duration::from_millis(500)),
            Verdict::Act(Action::Stop)
        );
    }

    #[test]
    fn test_worker_drops_stale_answers() {
        let mut sandbox = Sandbox::load(
            "stale",
            &loader(Slow(Duration::from_millis(60))),
            ExecutionMode::Worker,
        );
        assert!(matches!(
            sandbox.decide(&ctx(), Duration::from_millis(10)),
            Verdict::Lag(_)
        ));
        // The late reply to the first call must not be taken as this one's
        let verdict = sandbox.decide(&ctx(), Duration::from_millis(500));
        assert_eq!(verdict, Verdict::Act(Action::Shoot(0.0)));
    }

    #[test]
    fn test_load_fault_disables() {
        let failing: BrainLoader = Arc::new(|| -> Result<Box<dyn Brain>, LoadFault> {
            Err(LoadFault::MissingEntryPoint("ghost".into()))
        });
        let mut sandbox = Sandbox::load("ghost", &failing, ExecutionMode::Inline);
        assert!(sandbox.is_disabled());
        assert_eq!(
            sandbox.load_fault(),
            Some(&LoadFault::MissingEntryPoint("ghost".into()))
        );
        assert_eq!(sandbox.decide(&ctx(), BUDGET), Verdict::Disabled);
    }

    #[test]
    fn test_panicking_loader_is_load_fault() {
        let failing: BrainLoader = Arc::new(|| -> Result<Box<dyn Brain>, LoadFault> {
            panic!("constructor blew up")
        });
        let sandbox = Sandbox::load("boom", &failing, ExecutionMode::Worker);
        assert!(matches!(sandbox.load_fault(), Some(LoadFault::Init(m)) if m.contains("blew up")));
    }
}
