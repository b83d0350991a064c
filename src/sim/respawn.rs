//! Scheduled respawns
//!
//! Collected flames and power-ups come back after a fixed delay. Instead of
//! fire-and-forget timers, pending respawns sit in a queue keyed by fire
//! time and are drained at the start of each tick, which keeps the whole
//! simulation single-threaded and testable. Timers are never cancelled;
//! firing for an entity that is already alive is a no-op at the apply site.

use serde::{Deserialize, Serialize};

/// What a pending respawn re-activates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnTarget {
    /// Index into the world's flame list
    Flame(usize),
    /// Index into the world's power-up list
    PowerUp(usize),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Pending {
    fire_at: f64,
    target: RespawnTarget,
}

/// FIFO-per-deadline queue of pending respawns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespawnQueue {
    pending: Vec<Pending>,
}

impl RespawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `target` to re-activate once the clock reaches `fire_at`.
    pub fn schedule(&mut self, fire_at: f64, target: RespawnTarget) {
        self.pending.push(Pending { fire_at, target });
    }

    /// Remove and return every respawn due at or before `now`, in the
    /// order they were scheduled.
    pub fn drain_due(&mut self, now: f64) -> Vec<RespawnTarget> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.fire_at <= now {
                due.push(p.target);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_entries() {
        let mut q = RespawnQueue::new();
        q.schedule(1000.0, RespawnTarget::Flame(0));
        q.schedule(2000.0, RespawnTarget::Flame(1));
        q.schedule(1500.0, RespawnTarget::PowerUp(0));

        assert!(q.drain_due(999.0).is_empty());
        assert_eq!(q.len(), 3);

        let due = q.drain_due(1500.0);
        assert_eq!(due, vec![RespawnTarget::Flame(0), RespawnTarget::PowerUp(0)]);
        assert_eq!(q.len(), 1);

        let due = q.drain_due(10_000.0);
        assert_eq!(due, vec![RespawnTarget::Flame(1)]);
        assert!(q.is_empty());
    }

    #[test]
    fn fires_exactly_at_deadline() {
        let mut q = RespawnQueue::new();
        q.schedule(3000.0, RespawnTarget::Flame(5));
        assert!(q.drain_due(2999.9).is_empty());
        assert_eq!(q.drain_due(3000.0), vec![RespawnTarget::Flame(5)]);
    }
}
