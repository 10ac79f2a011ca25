//! Error types for configuration and decision-module boundaries
//!
//! Malformed actions are deliberately absent: they are a parse failure that
//! maps to "no action" and never reaches the caller.

use thiserror::Error;

/// A configuration value that the engine cannot run with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena must have a positive size, got {width}x{height}")]
    EmptyArena { width: f32, height: f32 },
    #[error("tick rate must be positive, got {0}")]
    TickRate(f32),
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("a session needs at least one entrant")]
    NoEntrants,
    #[error("{mode} needs exactly {expected} entrants, got {got}")]
    EntrantCount {
        mode: &'static str,
        expected: usize,
        got: usize,
    },
}

/// The decision module for a tank could not be made usable
///
/// Session-scoped: the tank keeps its body but never receives input again
/// until the session is reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFault {
    #[error("no bot named `{0}` exposes an update entry point")]
    MissingEntryPoint(String),
    #[error("bot failed to initialise: {0}")]
    Init(String),
    #[error("worker thread could not be started: {0}")]
    Worker(String),
}

/// A single decision call failed; that tick's action is discarded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionFault {
    #[error("bot returned an error: {0}")]
    Runtime(String),
    #[error("bot panicked: {0}")]
    Panic(String),
    #[error("bot worker is gone")]
    WorkerLost,
}
