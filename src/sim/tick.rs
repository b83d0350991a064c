//! Per-frame world step
//!
//! One call advances the whole match by `dt_ms`. Updates run in a fixed
//! order every tick: lifecycle check, due respawns, pickup physics, agents
//! (steer, move, collect, bank) in list order, pairwise steal resolution,
//! then particle aging. Events accumulate on the world and are drained by
//! the embedding layer after each tick.

use rand::Rng;

use super::GameEvent;
use super::ai;
use super::ghost::steal_between;
use super::respawn::RespawnTarget;
use super::state::{ControlMode, MatchPhase, Particle, World};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Let the bot controller drive player ghosts (demo/headless mode)
    pub autopilot: bool,
}

/// Advance the match by one tick of `dt_ms` milliseconds.
pub fn tick(world: &mut World, input: &TickInput, dt_ms: f32) {
    if world.phase == MatchPhase::Ended {
        return;
    }

    world.clock_ms += dt_ms as f64;
    let now = world.clock_ms;

    if now >= world.tuning.match_duration_ms {
        end_match(world);
        return;
    }

    let events_mark = world.events.len();
    let (w, h) = (world.tuning.width, world.tuning.height);

    apply_respawns(world);

    for f in &mut world.flames {
        if f.alive {
            f.drift(dt_ms, w, h);
        }
    }

    for gi in 0..world.ghosts.len() {
        let bot_driven = world.ghosts[gi].control == ControlMode::Ai
            || (input.autopilot && world.ghosts[gi].is_player());

        if bot_driven {
            // A missing base would mean a half-built world; skip steering
            // for the tick rather than fail it.
            if let Some(home) = world.base_for(world.ghosts[gi].team).map(|b| b.pos) {
                let steering = ai::steer(
                    &world.ghosts[gi],
                    &world.flames,
                    &world.ghosts,
                    home,
                    w,
                    &mut world.rng,
                );
                let g = &mut world.ghosts[gi];
                g.target_flame = steering.target;
                g.dir = steering.dir;
            }
        } else {
            world.ghosts[gi].steer_from_input(input);
        }

        world.ghosts[gi].integrate(dt_ms, now, w, h);
        world.ghosts[gi].collect_flames(
            &mut world.flames,
            now,
            &mut world.events,
            &mut world.respawns,
        );
        world.ghosts[gi].collect_powerups(
            &mut world.powerups,
            now,
            &mut world.events,
            &mut world.respawns,
        );

        if let Some(base) = world.base_for(world.ghosts[gi].team).copied() {
            world.ghosts[gi].bank(&base, now, &world.tuning, &mut world.events);
        }
    }

    // Every ordered pair; a steal is visible to the pairs evaluated after
    // it, and each pair transfers at most once per tick.
    for i in 0..world.ghosts.len() {
        for j in 0..world.ghosts.len() {
            if i != j {
                steal_between(&mut world.ghosts, i, j, now, &mut world.events);
            }
        }
    }

    // Team scores are derived on demand (`World::team_scores`); nothing to
    // accumulate here until the end-of-match snapshot.

    spawn_hint_particles(world, events_mark);
    for p in &mut world.particles {
        p.pos += p.vel * dt_ms * 0.05;
    }
    world.particles.retain(|p| !p.expired(now));
}

/// Apply every respawn whose deadline has passed. Firing for an entity
/// that is already alive is a no-op.
fn apply_respawns(world: &mut World) {
    let now = world.clock_ms;
    for target in world.respawns.drain_due(now) {
        match target {
            RespawnTarget::Flame(i) => {
                let pos = world.random_field_pos();
                let vel = glam::Vec2::new(
                    world.rng.random_range(-0.25..0.25),
                    world.rng.random_range(-0.25..0.25),
                );
                if let Some(f) = world.flames.get_mut(i) {
                    if !f.alive {
                        f.pos = pos;
                        f.vel = vel;
                        f.alive = true;
                        f.spawn_time = now;
                    }
                }
            }
            RespawnTarget::PowerUp(i) => {
                let pos = world.random_field_pos();
                if let Some(p) = world.powerups.get_mut(i) {
                    if !p.alive {
                        p.pos = pos;
                        p.alive = true;
                    }
                }
            }
        }
    }
}

/// Latch the end of the match: snapshot scores, then announce.
fn end_match(world: &mut World) {
    let scores = world.team_scores();
    world.final_scores = Some(scores);
    world.phase = MatchPhase::Ended;
    let (green, purple) = scores;
    log::info!("match over: green {green} - purple {purple}");
    world.events.push(GameEvent::MatchEnded { green, purple });
}

/// Turn the presentation hints emitted this tick into demo particles.
/// The world's pool only exists for headless/debug display; a real
/// renderer consumes the same hints from the event buffer.
fn spawn_hint_particles(world: &mut World, events_mark: usize) {
    let now = world.clock_ms;
    for k in events_mark..world.events.len() {
        let event = world.events[k];
        match event {
            GameEvent::Burst { pos, color } => {
                for _ in 0..BURST_PARTICLES {
                    let vel = glam::Vec2::new(
                        world.rng.random_range(-1.5..1.5),
                        world.rng.random_range(-1.5..1.5),
                    );
                    push_particle(
                        world,
                        Particle {
                            pos,
                            vel,
                            color,
                            birth: now,
                            life_ms: PARTICLE_LIFE_MS,
                        },
                    );
                }
            }
            GameEvent::BankTrail {
                from,
                to,
                count,
                team,
            } => {
                let color = super::state::FxColor::for_team(team);
                for i in 0..count {
                    let t = i as f32 / count as f32;
                    let jitter = glam::Vec2::new(
                        world.rng.random_range(-6.0..6.0),
                        world.rng.random_range(-6.0..6.0),
                    );
                    push_particle(
                        world,
                        Particle {
                            pos: from * (1.0 - t) + to * t + jitter,
                            vel: glam::Vec2::ZERO,
                            color,
                            birth: now,
                            life_ms: PARTICLE_LIFE_MS,
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn push_particle(world: &mut World, particle: Particle) {
    if world.particles.len() >= MAX_PARTICLES {
        world.particles.remove(0);
    }
    world.particles.push(particle);
}
