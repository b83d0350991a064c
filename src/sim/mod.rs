//! Deterministic simulation module
//!
//! All gameplay logic lives here. The module must stay pure and
//! deterministic:
//! - Single-threaded: one `tick` call at a time owns every collection
//! - Seeded RNG only; no wall-clock reads (time arrives as `dt_ms`)
//! - Deferred work (respawns) goes through the drainable queue, never
//!   through ad-hoc timers
//! - No rendering or storage dependencies; collaborators consume events

pub mod ai;
pub mod events;
pub mod ghost;
pub mod respawn;
pub mod state;
pub mod tick;

pub use events::GameEvent;
pub use ghost::steal_between;
pub use respawn::{RespawnQueue, RespawnTarget};
pub use state::{
    ActiveEffects, Base, ControlMode, Flame, FxColor, Ghost, MatchOutcome, MatchPhase, Particle,
    PowerUp, PowerUpKind, Team, TrailPoint, World,
};
pub use tick::{TickInput, tick};
