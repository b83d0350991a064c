//! Data-driven game balance
//!
//! Match-level knobs, separated from the fixed geometry constants so a
//! balance pass is a JSON edit rather than a rebuild. Defaults reproduce
//! the shipped game; loading falls back to them on any error.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance knobs for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Arena extent in world units
    pub width: f32,
    pub height: f32,
    /// AI ghosts per team (the purple side fields one extra to mirror the
    /// green player slot)
    pub bots_per_team: usize,
    pub flame_count: usize,
    pub powerup_count: usize,
    pub match_duration_ms: f64,
    /// Lifetime banked totals that gate the bank-driven buffs
    pub speed_boost_threshold: u32,
    pub magnet_threshold: u32,
    pub buff_duration_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            bots_per_team: BOTS_PER_TEAM,
            flame_count: FLAME_COUNT,
            powerup_count: POWERUP_COUNT,
            match_duration_ms: MATCH_DURATION_MS,
            speed_boost_threshold: SPEED_BOOST_THRESHOLD,
            magnet_threshold: MAGNET_THRESHOLD,
            buff_duration_ms: BUFF_DURATION_MS,
        }
    }
}

impl Tuning {
    /// Parse a tuning document; unspecified fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a file, falling back to defaults on any error.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {path}");
                    tuning
                }
                Err(err) => {
                    log::warn!("Ignoring malformed tuning file {path}: {err}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
