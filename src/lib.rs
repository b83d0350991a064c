//! Flame Rush - a two-team spirit arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, pickups, stealing, scoring)
//! - `progression`: Lifetime stats, achievements and cosmetic unlocks
//! - `tuning`: Data-driven match balance
//!
//! Rendering and input capture live outside this crate: the simulation
//! consumes a [`sim::TickInput`] each frame and emits [`sim::GameEvent`]s
//! for whatever presentation/persistence layer is attached.

pub mod progression;
pub mod sim;
pub mod tuning;

pub use progression::{Progression, ProgressionTracker};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;

    /// Arena defaults
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;
    /// Agents and pickups keep this far from the arena edge
    pub const MAP_MARGIN: f32 = 60.0;

    /// Entity radii
    pub const GHOST_RADIUS: f32 = 14.0;
    pub const FLAME_RADIUS: f32 = 6.0;
    pub const POWERUP_RADIUS: f32 = 10.0;
    pub const BASE_RADIUS: f32 = 60.0;

    /// Movement: per-tick acceleration scale and isotropic velocity damping
    pub const BASE_SPEED: f32 = 1.8;
    pub const SPEED_BOOST_MULT: f32 = 1.8;
    pub const ACCEL_COEFF: f32 = 0.02;
    pub const DAMPING: f32 = 0.9;

    /// Steering
    pub const PLAYER_STEER_LERP: f32 = 0.15;
    pub const AI_STEER_LERP: f32 = 0.1;
    pub const WANDER_CHANCE: f32 = 0.02;
    /// A bot carrying at least this many flames beelines home
    pub const RETURN_HOME_AT: u32 = 15;
    /// Bots ignore flames past this fraction of arena width from their side
    pub const TERRITORY_FRACTION: f32 = 0.7;
    /// Distance discount per carried flame when picking a target
    pub const STREAK_BIAS: f32 = 5.0;
    pub const AVOID_RADIUS: f32 = 80.0;
    pub const AVOID_STRENGTH: f32 = 30.0;

    /// Pickup detection
    pub const PICKUP_SLACK: f32 = 4.0;
    /// Extra detection range while night vision is active
    pub const DETECTION_BONUS: f32 = 14.0;
    /// Cascade-collect radius while the magnet buff is active
    pub const MAGNET_RADIUS: f32 = 80.0;
    pub const FLAME_RESPAWN_DELAY_MS: f64 = 3000.0;
    pub const POWERUP_RESPAWN_DELAY_MS: f64 = 12_000.0;

    /// Carrying / stealing
    pub const TRAIL_PER_FLAME: usize = 6;
    pub const STEAL_DISTANCE: f32 = 18.0;
    pub const STEAL_FRACTION: f32 = 0.4;

    /// Banking
    pub const BANK_MARGIN: f32 = 10.0;
    pub const SPEED_BOOST_THRESHOLD: u32 = 15;
    pub const MAGNET_THRESHOLD: u32 = 40;
    pub const BUFF_DURATION_MS: f64 = 8000.0;

    /// Power-up effect durations
    pub const INVINCIBILITY_MS: f64 = 5000.0;
    pub const NIGHT_VISION_MS: f64 = 10_000.0;

    /// Match defaults
    pub const MATCH_DURATION_MS: f64 = 120_000.0;
    pub const BOTS_PER_TEAM: usize = 3;
    pub const FLAME_COUNT: usize = 70;
    pub const POWERUP_COUNT: usize = 4;

    /// Particle pool (visual only, never gameplay-affecting)
    pub const BURST_PARTICLES: usize = 14;
    pub const PARTICLE_LIFE_MS: f32 = 700.0;
    pub const MAX_PARTICLES: usize = 512;
}

/// Ease a steering vector toward a target direction.
///
/// The factor is per-tick; callers pass a zero target to let the vector
/// decay instead of snapping to a stop.
#[inline]
pub fn blend_dir(current: Vec2, target: Vec2, t: f32) -> Vec2 {
    current * (1.0 - t) + target * t
}

/// Unit vector from `from` toward `to`, or zero when the points coincide.
#[inline]
pub fn dir_towards(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
