//! Ghost behavior: movement integration, carrying, banking, stealing
//!
//! These are the per-agent operations the tick loop applies in order. All
//! of them take the simulation clock explicitly; nothing here reads wall
//! time.

use glam::Vec2;

use super::GameEvent;
use super::respawn::{RespawnQueue, RespawnTarget};
use super::state::{Base, Flame, FxColor, Ghost, PowerUp, PowerUpKind, TrailPoint};
use super::tick::TickInput;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::blend_dir;

impl Ghost {
    /// Ease direction intent toward the normalized sum of held inputs.
    ///
    /// With no keys held the intent decays toward zero rather than
    /// stopping dead, which gives the drift/momentum feel.
    pub fn steer_from_input(&mut self, input: &TickInput) {
        let mut wish = Vec2::ZERO;
        if input.up {
            wish.y -= 1.0;
        }
        if input.down {
            wish.y += 1.0;
        }
        if input.left {
            wish.x -= 1.0;
        }
        if input.right {
            wish.x += 1.0;
        }
        let wish = wish.normalize_or_zero();
        self.dir = blend_dir(self.dir, wish, PLAYER_STEER_LERP);
    }

    /// Effective speed for this tick, after buffs.
    pub fn effective_speed(&self, now: f64) -> f32 {
        if self.effects.speed_active(now) {
            BASE_SPEED * SPEED_BOOST_MULT
        } else {
            BASE_SPEED
        }
    }

    /// Advance physics one tick: accelerate along the intent, damp, move,
    /// clamp to the arena, and maintain the carrier trail.
    pub fn integrate(&mut self, dt_ms: f32, now: f64, width: f32, height: f32) {
        let accel = ACCEL_COEFF * dt_ms * self.effective_speed(now);
        self.vel += self.dir * accel;
        self.vel *= DAMPING;

        self.pos += self.vel;
        self.pos.x = self.pos.x.clamp(MAP_MARGIN, width - MAP_MARGIN);
        self.pos.y = self.pos.y.clamp(MAP_MARGIN, height - MAP_MARGIN);

        if self.carrying > 0 {
            self.trail.insert(
                0,
                TrailPoint {
                    pos: self.pos,
                    t: now,
                },
            );
            self.trail.truncate(self.carrying as usize * TRAIL_PER_FLAME);
        } else {
            self.trail.clear();
        }
    }

    /// Pickup detection radius around this ghost's center.
    fn detection_reach(&self, now: f64, target_radius: f32) -> f32 {
        let slack = if self.effects.detection_active(now) {
            PICKUP_SLACK + DETECTION_BONUS
        } else {
            PICKUP_SLACK
        };
        GHOST_RADIUS + target_radius + slack
    }

    /// Collect every alive flame in reach. A collected flame dies, bumps
    /// `carrying`, emits an event plus a burst hint, and schedules its
    /// respawn. With the magnet buff active, each direct pickup cascades
    /// one hop to flames near the collected flame's position; cascade hits
    /// do not chain further within the same tick.
    pub fn collect_flames(
        &mut self,
        flames: &mut [Flame],
        now: f64,
        events: &mut Vec<GameEvent>,
        respawns: &mut RespawnQueue,
    ) {
        let reach = self.detection_reach(now, FLAME_RADIUS);
        let color = FxColor::for_team(self.team);

        for i in 0..flames.len() {
            if !flames[i].alive {
                continue;
            }
            if self.pos.distance(flames[i].pos) >= reach {
                continue;
            }

            let picked_at = flames[i].pos;
            flames[i].alive = false;
            self.carrying += 1;
            events.push(GameEvent::FlameCollected {
                ghost_id: self.id,
                is_player: self.is_player(),
            });
            events.push(GameEvent::Burst {
                pos: picked_at,
                color,
            });
            respawns.schedule(now + FLAME_RESPAWN_DELAY_MS, RespawnTarget::Flame(i));

            if self.effects.magnet_active(now) {
                for j in 0..flames.len() {
                    if !flames[j].alive {
                        continue;
                    }
                    if picked_at.distance(flames[j].pos) >= MAGNET_RADIUS {
                        continue;
                    }
                    flames[j].alive = false;
                    self.carrying += 1;
                    events.push(GameEvent::FlameCollected {
                        ghost_id: self.id,
                        is_player: self.is_player(),
                    });
                    events.push(GameEvent::Burst {
                        pos: flames[j].pos,
                        color,
                    });
                    respawns.schedule(now + FLAME_RESPAWN_DELAY_MS, RespawnTarget::Flame(j));
                }
            }
        }
    }

    /// Pick up any alive power-up pad in reach, granting its timed effect.
    pub fn collect_powerups(
        &mut self,
        powerups: &mut [PowerUp],
        now: f64,
        events: &mut Vec<GameEvent>,
        respawns: &mut RespawnQueue,
    ) {
        let reach = self.detection_reach(now, POWERUP_RADIUS);

        for i in 0..powerups.len() {
            if !powerups[i].alive {
                continue;
            }
            if self.pos.distance(powerups[i].pos) >= reach {
                continue;
            }

            powerups[i].alive = false;
            match powerups[i].kind {
                PowerUpKind::Invincibility => {
                    self.effects.invincible_until = now + INVINCIBILITY_MS;
                }
                PowerUpKind::NightVision => {
                    self.effects.detection_until = now + NIGHT_VISION_MS;
                }
            }
            events.push(GameEvent::PowerupCollected {
                ghost_id: self.id,
                is_player: self.is_player(),
                kind: powerups[i].kind,
            });
            events.push(GameEvent::Burst {
                pos: powerups[i].pos,
                color: FxColor::Ember,
            });
            respawns.schedule(now + POWERUP_RESPAWN_DELAY_MS, RespawnTarget::PowerUp(i));
        }
    }

    /// Bank carried flames when inside the home base: convert them into
    /// score, then re-check the buff thresholds.
    ///
    /// The threshold grants are gated only on "total ≥ threshold AND the
    /// previous grant has lapsed", so once a total crosses a threshold the
    /// buff refreshes every time it expires.
    pub fn bank(
        &mut self,
        base: &Base,
        now: f64,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        if self.carrying == 0 {
            return;
        }
        if self.pos.distance(base.pos) > BASE_RADIUS - BANK_MARGIN {
            return;
        }

        let amount = self.carrying;
        self.score += amount;
        self.banked_total += amount;

        events.push(GameEvent::BankTrail {
            from: self.pos,
            to: base.pos,
            count: amount,
            team: self.team,
        });
        events.push(GameEvent::Banked {
            ghost_id: self.id,
            is_player: self.is_player(),
            amount,
            new_score: self.score,
        });

        self.carrying = 0;
        self.trail.clear();

        if self.banked_total >= tuning.speed_boost_threshold && now >= self.effects.speed_until {
            self.effects.speed_until = now + tuning.buff_duration_ms;
        }
        if self.banked_total >= tuning.magnet_threshold && now >= self.effects.magnet_until {
            self.effects.magnet_until = now + tuning.buff_duration_ms;
        }
    }
}

/// Resolve one ordered steal attempt: `thief` tries to grab from
/// `victim`'s trail. Walks every other trail point and transfers
/// `max(1, floor(carrying * 0.4))` on the first hit, truncating the
/// victim's trail to match. At most one steal per pair per tick.
pub fn steal_between(
    ghosts: &mut [Ghost],
    thief: usize,
    victim: usize,
    now: f64,
    events: &mut Vec<GameEvent>,
) {
    if thief == victim {
        return;
    }
    let (t, v) = pair_mut(ghosts, thief, victim);

    if v.carrying == 0 || t.team == v.team || v.effects.invincible(now) {
        return;
    }

    let hit_pos = v
        .trail
        .iter()
        .step_by(2)
        .find(|point| t.pos.distance(point.pos) < STEAL_DISTANCE)
        .map(|point| point.pos);
    if let Some(pos) = hit_pos {
        let stolen = ((v.carrying as f32 * STEAL_FRACTION).floor() as u32).max(1);
        v.carrying -= stolen;
        t.carrying += stolen;
        v.trail.truncate(v.carrying as usize * TRAIL_PER_FLAME);

        events.push(GameEvent::StealPerformed {
            ghost_id: t.id,
            is_player: t.is_player(),
        });
        events.push(GameEvent::Burst {
            pos,
            color: FxColor::White,
        });
    }
}

/// Simultaneous mutable access to two distinct ghosts.
fn pair_mut(ghosts: &mut [Ghost], a: usize, b: usize) -> (&mut Ghost, &mut Ghost) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = ghosts.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = ghosts.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ControlMode, Team};
    use proptest::prelude::*;

    fn ghost(id: u32, pos: Vec2, team: Team) -> Ghost {
        Ghost::new(id, pos, team, ControlMode::Ai)
    }

    fn carrier_with_trail(id: u32, pos: Vec2, team: Team, carrying: u32) -> Ghost {
        let mut g = ghost(id, pos, team);
        g.carrying = carrying;
        for i in 0..(carrying as usize * TRAIL_PER_FLAME) {
            g.trail.push(TrailPoint {
                pos: pos + Vec2::new(i as f32 * 4.0, 0.0),
                t: 0.0,
            });
        }
        g
    }

    #[test]
    fn integrate_clamps_to_arena() {
        let mut g = ghost(1, Vec2::new(MAP_MARGIN + 1.0, MAP_MARGIN + 1.0), Team::Green);
        g.dir = Vec2::new(-1.0, -1.0).normalize();
        for _ in 0..600 {
            g.integrate(SIM_DT_MS, 0.0, ARENA_WIDTH, ARENA_HEIGHT);
        }
        assert_eq!(g.pos.x, MAP_MARGIN);
        assert_eq!(g.pos.y, MAP_MARGIN);
    }

    #[test]
    fn trail_tracks_carrying() {
        let mut g = ghost(1, Vec2::new(300.0, 300.0), Team::Green);
        g.carrying = 2;
        for i in 0..40 {
            g.integrate(SIM_DT_MS, i as f64 * SIM_DT_MS as f64, ARENA_WIDTH, ARENA_HEIGHT);
        }
        assert_eq!(g.trail.len(), 2 * TRAIL_PER_FLAME);
        // newest first
        assert!(g.trail[0].t > g.trail[1].t);

        g.carrying = 0;
        g.integrate(SIM_DT_MS, 999.0, ARENA_WIDTH, ARENA_HEIGHT);
        assert!(g.trail.is_empty());
    }

    #[test]
    fn collects_flame_in_reach_and_schedules_respawn() {
        let mut g = ghost(1, Vec2::new(300.0, 300.0), Team::Green);
        let mut flames = vec![
            Flame::new(Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0),
            Flame::new(Vec2::new(900.0, 300.0), Vec2::ZERO, 0.0),
        ];
        let mut events = Vec::new();
        let mut respawns = RespawnQueue::new();

        g.collect_flames(&mut flames, 100.0, &mut events, &mut respawns);

        assert_eq!(g.carrying, 1);
        assert!(!flames[0].alive);
        assert!(flames[1].alive);
        assert_eq!(respawns.len(), 1);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::FlameCollected { ghost_id: 1, .. }
        )));
        assert_eq!(
            respawns.drain_due(100.0 + FLAME_RESPAWN_DELAY_MS),
            vec![RespawnTarget::Flame(0)]
        );
    }

    #[test]
    fn magnet_cascades_one_hop() {
        let mut g = ghost(1, Vec2::new(300.0, 300.0), Team::Green);
        g.effects.magnet_until = 1000.0;
        let mut flames = vec![
            // direct pickup
            Flame::new(Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0),
            // within MAGNET_RADIUS of the pickup
            Flame::new(Vec2::new(360.0, 300.0), Vec2::ZERO, 0.0),
            // within MAGNET_RADIUS of flame 1 but not of flame 0: must
            // survive, the cascade is a single hop
            Flame::new(Vec2::new(430.0, 300.0), Vec2::ZERO, 0.0),
        ];
        let mut events = Vec::new();
        let mut respawns = RespawnQueue::new();

        g.collect_flames(&mut flames, 0.0, &mut events, &mut respawns);

        assert_eq!(g.carrying, 2);
        assert!(!flames[0].alive);
        assert!(!flames[1].alive);
        assert!(flames[2].alive);
    }

    #[test]
    fn night_vision_extends_detection() {
        let flame_pos = Vec2::new(300.0, 300.0);
        let gap = GHOST_RADIUS + FLAME_RADIUS + PICKUP_SLACK + 6.0;
        let mut flames = vec![Flame::new(flame_pos, Vec2::ZERO, 0.0)];
        let mut events = Vec::new();
        let mut respawns = RespawnQueue::new();

        let mut g = ghost(1, flame_pos + Vec2::new(gap, 0.0), Team::Green);
        g.collect_flames(&mut flames, 0.0, &mut events, &mut respawns);
        assert_eq!(g.carrying, 0, "out of reach without the buff");

        g.effects.detection_until = 1000.0;
        g.collect_flames(&mut flames, 0.0, &mut events, &mut respawns);
        assert_eq!(g.carrying, 1);
    }

    #[test]
    fn powerup_grants_matching_effect() {
        let mut g = ghost(1, Vec2::new(300.0, 300.0), Team::Green);
        let mut pads = vec![PowerUp {
            pos: Vec2::new(300.0, 300.0),
            kind: PowerUpKind::Invincibility,
            alive: true,
        }];
        let mut events = Vec::new();
        let mut respawns = RespawnQueue::new();

        g.collect_powerups(&mut pads, 200.0, &mut events, &mut respawns);

        assert!(!pads[0].alive);
        assert!(g.effects.invincible(200.0 + INVINCIBILITY_MS - 1.0));
        assert!(!g.effects.invincible(200.0 + INVINCIBILITY_MS + 1.0));
        assert_eq!(respawns.len(), 1);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PowerupCollected {
                kind: PowerUpKind::Invincibility,
                ..
            }
        )));
    }

    #[test]
    fn banking_converts_carrying_to_score() {
        let tuning = Tuning::default();
        let base = Base {
            pos: Vec2::new(130.0, 360.0),
            team: Team::Green,
        };
        let mut g = carrier_with_trail(1, base.pos, Team::Green, 5);
        let mut events = Vec::new();

        g.bank(&base, 0.0, &tuning, &mut events);

        assert_eq!(g.score, 5);
        assert_eq!(g.banked_total, 5);
        assert_eq!(g.carrying, 0);
        assert!(g.trail.is_empty());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Banked {
                amount: 5,
                new_score: 5,
                ..
            }
        )));
    }

    #[test]
    fn bank_outside_base_is_a_noop() {
        let tuning = Tuning::default();
        let base = Base {
            pos: Vec2::new(130.0, 360.0),
            team: Team::Green,
        };
        let mut g = carrier_with_trail(1, base.pos + Vec2::new(BASE_RADIUS, 0.0), Team::Green, 5);
        let mut events = Vec::new();

        g.bank(&base, 0.0, &tuning, &mut events);
        assert_eq!(g.carrying, 5);
        assert!(events.is_empty());
    }

    #[test]
    fn threshold_buff_regrants_after_lapse() {
        let tuning = Tuning::default();
        let base = Base {
            pos: Vec2::new(130.0, 360.0),
            team: Team::Green,
        };
        let mut g = carrier_with_trail(1, base.pos, Team::Green, tuning.speed_boost_threshold);
        let mut events = Vec::new();

        g.bank(&base, 0.0, &tuning, &mut events);
        assert!(g.effects.speed_active(1.0));
        let first_expiry = g.effects.speed_until;

        // While still active, a further bank must not extend the buff
        g.carrying = 1;
        g.bank(&base, 100.0, &tuning, &mut events);
        assert_eq!(g.effects.speed_until, first_expiry);

        // After it lapses, a bank below the threshold crossing still
        // refreshes it: the gate is total >= threshold, not a re-cross
        g.carrying = 1;
        let later = first_expiry + 1.0;
        g.bank(&base, later, &tuning, &mut events);
        assert_eq!(g.effects.speed_until, later + tuning.buff_duration_ms);
    }

    #[test]
    fn steal_transfers_and_truncates() {
        let mut ghosts = vec![
            carrier_with_trail(1, Vec2::new(400.0, 300.0), Team::Green, 10),
            ghost(2, Vec2::new(400.0, 300.0), Team::Purple),
        ];
        let mut events = Vec::new();

        steal_between(&mut ghosts, 1, 0, 0.0, &mut events);

        assert_eq!(ghosts[0].carrying, 6);
        assert_eq!(ghosts[1].carrying, 4);
        assert!(ghosts[0].trail.len() <= 6 * TRAIL_PER_FLAME);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::StealPerformed { ghost_id: 2, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn steal_ignores_teammates_and_empty_carriers() {
        let mut ghosts = vec![
            carrier_with_trail(1, Vec2::new(400.0, 300.0), Team::Green, 10),
            ghost(2, Vec2::new(400.0, 300.0), Team::Green),
            ghost(3, Vec2::new(400.0, 300.0), Team::Purple),
        ];
        let mut events = Vec::new();

        // teammate
        steal_between(&mut ghosts, 1, 0, 0.0, &mut events);
        assert_eq!(ghosts[0].carrying, 10);

        // victim carrying nothing
        steal_between(&mut ghosts, 0, 2, 0.0, &mut events);
        assert_eq!(ghosts[0].carrying, 10);
        assert!(events.is_empty());
    }

    #[test]
    fn steal_respects_invincibility() {
        let mut ghosts = vec![
            carrier_with_trail(1, Vec2::new(400.0, 300.0), Team::Green, 10),
            ghost(2, Vec2::new(400.0, 300.0), Team::Purple),
        ];
        ghosts[0].effects.invincible_until = 5000.0;
        let mut events = Vec::new();

        steal_between(&mut ghosts, 1, 0, 100.0, &mut events);

        assert_eq!(ghosts[0].carrying, 10);
        assert_eq!(ghosts[1].carrying, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn steal_takes_at_least_one() {
        let mut ghosts = vec![
            carrier_with_trail(1, Vec2::new(400.0, 300.0), Team::Green, 1),
            ghost(2, Vec2::new(400.0, 300.0), Team::Purple),
        ];
        let mut events = Vec::new();

        steal_between(&mut ghosts, 1, 0, 0.0, &mut events);
        assert_eq!(ghosts[0].carrying, 0);
        assert_eq!(ghosts[1].carrying, 1);
        assert!(ghosts[0].trail.is_empty());
    }

    proptest! {
        #[test]
        fn steal_conserves_total(carrying in 1u32..200) {
            let mut ghosts = vec![
                carrier_with_trail(1, Vec2::new(400.0, 300.0), Team::Green, carrying),
                ghost(2, Vec2::new(400.0, 300.0), Team::Purple),
            ];
            let mut events = Vec::new();

            steal_between(&mut ghosts, 1, 0, 0.0, &mut events);

            let stolen = ((carrying as f32 * STEAL_FRACTION).floor() as u32).max(1);
            prop_assert_eq!(ghosts[1].carrying, stolen);
            prop_assert_eq!(ghosts[0].carrying + ghosts[1].carrying, carrying);
        }

        #[test]
        fn integration_stays_in_bounds(
            dir_x in -1.0f32..1.0,
            dir_y in -1.0f32..1.0,
            start_x in MAP_MARGIN..(ARENA_WIDTH - MAP_MARGIN),
            start_y in MAP_MARGIN..(ARENA_HEIGHT - MAP_MARGIN),
        ) {
            let mut g = ghost(1, Vec2::new(start_x, start_y), Team::Green);
            g.dir = Vec2::new(dir_x, dir_y);
            for i in 0..240 {
                g.integrate(SIM_DT_MS, i as f64 * SIM_DT_MS as f64, ARENA_WIDTH, ARENA_HEIGHT);
                prop_assert!(g.pos.x >= MAP_MARGIN && g.pos.x <= ARENA_WIDTH - MAP_MARGIN);
                prop_assert!(g.pos.y >= MAP_MARGIN && g.pos.y <= ARENA_HEIGHT - MAP_MARGIN);
            }
        }
    }
}
