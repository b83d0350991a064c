//! Game state and core simulation types
//!
//! Everything the tick loop mutates lives on the [`World`] aggregate; the
//! particle pool and per-tick event buffer are transient and skipped when
//! serializing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::respawn::RespawnQueue;
use crate::consts::*;
use crate::tuning::Tuning;

/// The two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Green,
    Purple,
}

impl Team {
    /// The opposing team
    pub fn rival(self) -> Team {
        match self {
            Team::Green => Team::Purple,
            Team::Purple => Team::Green,
        }
    }
}

/// Who drives a ghost's steering each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Direction intent comes from [`super::TickInput`]
    PlayerInput,
    /// Direction intent comes from the bot controller
    Ai,
}

/// One entry of a carrier's spirit trail (newest first)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Simulation clock at the time the point was recorded (ms)
    pub t: f64,
}

/// Timed buffs as absolute expiry timestamps on the simulation clock.
///
/// A zeroed expiry is always in the past, so `Default` means "nothing
/// active".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub speed_until: f64,
    pub magnet_until: f64,
    pub invincible_until: f64,
    pub detection_until: f64,
}

impl ActiveEffects {
    pub fn speed_active(&self, now: f64) -> bool {
        now < self.speed_until
    }

    pub fn magnet_active(&self, now: f64) -> bool {
        now < self.magnet_until
    }

    pub fn invincible(&self, now: f64) -> bool {
        now < self.invincible_until
    }

    pub fn detection_active(&self, now: f64) -> bool {
        now < self.detection_until
    }
}

/// A collectible flame.
///
/// Flames are never destroyed: collection clears `alive` and a scheduled
/// respawn re-activates the same slot at a fresh position, so indices into
/// the flame list stay valid for a whole match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flame {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
    /// When this flame (re)appeared, for spawn-flicker presentation
    pub spawn_time: f64,
}

impl Flame {
    pub fn new(pos: Vec2, vel: Vec2, now: f64) -> Self {
        Self {
            pos,
            vel,
            alive: true,
            spawn_time: now,
        }
    }

    /// Slow ambient drift, bouncing off the margin band.
    pub fn drift(&mut self, dt_ms: f32, width: f32, height: f32) {
        self.pos += self.vel * dt_ms * 0.04;

        if self.pos.x < MAP_MARGIN || self.pos.x > width - MAP_MARGIN {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < MAP_MARGIN || self.pos.y > height - MAP_MARGIN {
            self.vel.y = -self.vel.y;
        }
    }
}

/// Power-up pad kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Carried flames cannot be stolen while active
    Invincibility,
    /// Widens pickup detection range while active
    NightVision,
}

/// A power-up pad; same respawn-by-reactivation lifecycle as [`Flame`],
/// with a longer delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub alive: bool,
}

/// A team's home base, fixed for the whole match
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Base {
    pub pos: Vec2,
    pub team: Team,
}

/// Palette slot for burst/trail particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FxColor {
    TeamGreen,
    TeamPurple,
    White,
    Ember,
}

impl FxColor {
    pub fn for_team(team: Team) -> Self {
        match team {
            Team::Green => FxColor::TeamGreen,
            Team::Purple => FxColor::TeamPurple,
        }
    }
}

/// A visual-feedback particle; owned by the world for convenience but
/// never read back by gameplay logic.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: FxColor,
    pub birth: f64,
    pub life_ms: f32,
}

impl Particle {
    pub fn expired(&self, now: f64) -> bool {
        now - self.birth > self.life_ms as f64
    }
}

/// Match lifecycle; `Ended` is a one-way latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Running,
    Ended,
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(Team),
    Tie,
}

/// A player- or bot-controlled ghost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ghost {
    pub id: u32,
    pub team: Team,
    pub control: ControlMode,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Eased steering intent, roughly unit length when moving
    pub dir: Vec2,
    /// Flames currently held; lost on steal, zeroed on bank
    pub carrying: u32,
    /// Lifetime banked count, monotonic; gates buff grants
    pub banked_total: u32,
    /// Sum of all successful bank amounts this match
    pub score: u32,
    pub effects: ActiveEffects,
    /// Position history while carrying, newest first; doubles as the
    /// steal hitbox chain
    pub trail: Vec<TrailPoint>,
    /// Cached bot target, re-validated for liveness every tick
    pub target_flame: Option<usize>,
}

impl Ghost {
    pub fn new(id: u32, pos: Vec2, team: Team, control: ControlMode) -> Self {
        Self {
            id,
            team,
            control,
            pos,
            vel: Vec2::ZERO,
            dir: Vec2::ZERO,
            carrying: 0,
            banked_total: 0,
            score: 0,
            effects: ActiveEffects::default(),
            trail: Vec::new(),
            target_flame: None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.control == ControlMode::PlayerInput
    }
}

fn skipped_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete match state, owned by the tick loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation clock in ms since match start
    pub clock_ms: f64,
    pub phase: MatchPhase,
    pub ghosts: Vec<Ghost>,
    pub flames: Vec<Flame>,
    pub powerups: Vec<PowerUp>,
    pub bases: Vec<Base>,
    pub respawns: RespawnQueue,
    /// Team scores snapshotted at the moment the match ended
    pub final_scores: Option<(u32, u32)>,
    /// Visual pool, drained/aged by the tick but not authoritative
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events emitted since the last [`World::drain_events`]
    #[serde(skip)]
    pub events: Vec<super::GameEvent>,
    #[serde(skip, default = "skipped_rng")]
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Create and populate a match: one base and `bots_per_team` bots per
    /// side, one player ghost on green, flames and power-up pads scattered
    /// over the field.
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        let mut world = Self {
            seed,
            tuning: tuning.clone(),
            clock_ms: 0.0,
            phase: MatchPhase::Running,
            ghosts: Vec::new(),
            flames: Vec::new(),
            powerups: Vec::new(),
            bases: Vec::new(),
            respawns: RespawnQueue::new(),
            final_scores: None,
            particles: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        world.populate();
        world
    }

    fn populate(&mut self) {
        let (w, h) = (self.tuning.width, self.tuning.height);
        let center_y = h / 2.0;
        let inset = MAP_MARGIN + BASE_RADIUS + 10.0;

        let green_base = Base {
            pos: Vec2::new(inset, center_y),
            team: Team::Green,
        };
        let purple_base = Base {
            pos: Vec2::new(w - inset, center_y),
            team: Team::Purple,
        };
        self.bases.push(green_base);
        self.bases.push(purple_base);

        let player_id = self.next_entity_id();
        self.ghosts.push(Ghost::new(
            player_id,
            green_base.pos,
            Team::Green,
            ControlMode::PlayerInput,
        ));

        for _ in 0..self.tuning.bots_per_team {
            let jitter = self.spawn_jitter();
            let id = self.next_entity_id();
            self.ghosts.push(Ghost::new(
                id,
                green_base.pos + jitter,
                Team::Green,
                ControlMode::Ai,
            ));
        }

        // One extra purple bot stands in for the player slot
        for _ in 0..self.tuning.bots_per_team + 1 {
            let jitter = self.spawn_jitter();
            let id = self.next_entity_id();
            self.ghosts.push(Ghost::new(
                id,
                purple_base.pos + jitter,
                Team::Purple,
                ControlMode::Ai,
            ));
        }

        for _ in 0..self.tuning.flame_count {
            let pos = self.random_field_pos();
            let vel = Vec2::new(
                self.rng.random_range(-0.25..0.25),
                self.rng.random_range(-0.25..0.25),
            );
            self.flames.push(Flame::new(pos, vel, 0.0));
        }

        for i in 0..self.tuning.powerup_count {
            let kind = if i % 2 == 0 {
                PowerUpKind::Invincibility
            } else {
                PowerUpKind::NightVision
            };
            let pos = self.random_field_pos();
            self.powerups.push(PowerUp {
                pos,
                kind,
                alive: true,
            });
        }
    }

    fn spawn_jitter(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.random_range(-40.0..40.0),
            self.rng.random_range(-40.0..40.0),
        )
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// A uniformly random position inside the margin-inset field
    pub fn random_field_pos(&mut self) -> Vec2 {
        Vec2::new(
            self.rng
                .random_range(MAP_MARGIN..self.tuning.width - MAP_MARGIN),
            self.rng
                .random_range(MAP_MARGIN..self.tuning.height - MAP_MARGIN),
        )
    }

    /// The home base for a team. Bases are created at match start; a
    /// missing one means a half-built test world, so callers treat this as
    /// a skippable lookup rather than an invariant.
    pub fn base_for(&self, team: Team) -> Option<&Base> {
        self.bases.iter().find(|b| b.team == team)
    }

    /// Current (green, purple) score totals across all ghosts
    pub fn team_scores(&self) -> (u32, u32) {
        let mut green = 0;
        let mut purple = 0;
        for g in &self.ghosts {
            match g.team {
                Team::Green => green += g.score,
                Team::Purple => purple += g.score,
            }
        }
        (green, purple)
    }

    /// Snapshotted final scores, or the live totals while still running
    pub fn final_scores(&self) -> Option<(u32, u32)> {
        self.final_scores
    }

    /// Match result, available once the match has ended
    pub fn outcome(&self) -> Option<MatchOutcome> {
        let (green, purple) = self.final_scores?;
        Some(if green > purple {
            MatchOutcome::Winner(Team::Green)
        } else if purple > green {
            MatchOutcome::Winner(Team::Purple)
        } else {
            MatchOutcome::Tie
        })
    }

    /// Take all events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<super::GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn effects_expire_on_the_clock() {
        let mut fx = ActiveEffects::default();
        assert!(!fx.speed_active(0.0));

        fx.speed_until = 500.0;
        fx.invincible_until = 500.0;
        assert!(fx.speed_active(499.0));
        assert!(!fx.speed_active(500.0));
        assert!(fx.invincible(100.0));
        assert!(!fx.invincible(501.0));
    }

    #[test]
    fn populate_builds_symmetric_teams() {
        let tuning = Tuning::default();
        let world = World::new(&tuning, 7);

        assert_eq!(world.bases.len(), 2);
        assert_eq!(world.ghosts.len(), 2 * (tuning.bots_per_team + 1));
        assert_eq!(world.flames.len(), tuning.flame_count);
        assert_eq!(world.powerups.len(), tuning.powerup_count);

        let green = world
            .ghosts
            .iter()
            .filter(|g| g.team == Team::Green)
            .count();
        let purple = world.ghosts.len() - green;
        assert_eq!(green, purple);
        assert_eq!(
            world
                .ghosts
                .iter()
                .filter(|g| g.control == ControlMode::PlayerInput)
                .count(),
            1
        );
    }

    #[test]
    fn flames_spawn_inside_the_margin_band() {
        let tuning = Tuning::default();
        let world = World::new(&tuning, 42);
        for f in &world.flames {
            assert!(f.alive);
            assert!(f.pos.x >= MAP_MARGIN && f.pos.x <= tuning.width - MAP_MARGIN);
            assert!(f.pos.y >= MAP_MARGIN && f.pos.y <= tuning.height - MAP_MARGIN);
        }
    }

    #[test]
    fn flame_drift_bounces_at_margins() {
        let mut flame = Flame::new(Vec2::new(MAP_MARGIN + 0.1, 300.0), Vec2::new(-0.25, 0.0), 0.0);
        for _ in 0..10 {
            flame.drift(16.0, 1280.0, 720.0);
        }
        assert!(flame.vel.x > 0.0, "x velocity should have flipped inward");
    }

    #[test]
    fn outcome_requires_ended_match() {
        let world = World::new(&Tuning::default(), 1);
        assert_eq!(world.outcome(), None);
    }
}
