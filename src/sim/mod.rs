//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and the same decision
//! outputs, a session replays exactly:
//! - Fixed timestep only
//! - Seeded RNG only, consumed in a fixed order
//! - Stable iteration order (by entity ID)
//! - Bots only see copied snapshots, never live state

pub mod action;
pub mod collision;
pub mod context;
pub mod geometry;
pub mod modes;
pub mod sensors;
pub mod session;
pub mod state;
pub mod tank;
pub mod tick;

pub use action::Action;
pub use collision::{resolve_box_wall, resolve_wall_contacts};
pub use context::{BossView, Context, build_context};
pub use geometry::Aabb;
pub use modes::{Boss, HazardZone, Juggernaut, Labyrinth, ModeController, Scramble, ShrinkingZone, WeaponPhase};
pub use sensors::{Sensors, sensor_readings};
pub use session::GameSession;
pub use state::{
    ActionOutcome, Coin, FaultKind, GameEvent, ModeKind, Outcome, Projectile, Shooter, TankId, Wall, World,
};
pub use tank::Tank;
pub use tick::{FrameClock, tick};
