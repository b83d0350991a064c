//! Core-to-collaborator event contract
//!
//! The simulation never touches storage or a display directly; it pushes
//! these events into the world's per-tick buffer and the embedding layer
//! drains them. Terminal events (collect/steal/bank/match-end) drive the
//! progression tracker; `Burst` and `BankTrail` are fire-and-forget hints
//! for the presentation layer and may be ignored without affecting
//! simulation correctness.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{FxColor, PowerUpKind, Team};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    FlameCollected {
        ghost_id: u32,
        is_player: bool,
    },
    PowerupCollected {
        ghost_id: u32,
        is_player: bool,
        kind: PowerUpKind,
    },
    StealPerformed {
        ghost_id: u32,
        is_player: bool,
    },
    Banked {
        ghost_id: u32,
        is_player: bool,
        amount: u32,
        /// The ghost's match score after this bank
        new_score: u32,
    },
    MatchEnded {
        green: u32,
        purple: u32,
    },
    /// Presentation hint: radial particle burst
    Burst {
        pos: Vec2,
        color: FxColor,
    },
    /// Presentation hint: spirits streaming from a carrier to its base
    BankTrail {
        from: Vec2,
        to: Vec2,
        count: u32,
        team: Team,
    },
}

impl GameEvent {
    /// Whether this event is a presentation hint rather than part of the
    /// progression contract.
    pub fn is_hint(&self) -> bool {
        matches!(self, GameEvent::Burst { .. } | GameEvent::BankTrail { .. })
    }
}
