//! Lifetime progression: counters, achievements, cosmetics
//!
//! Consumes the terminal events the simulation emits and keeps lifetime
//! counters across matches. Counters feed achievement thresholds, and
//! achievements unlock ghost skins. State is persisted as a JSON payload
//! through a small key-value [`ProgressStore`] so the backing storage
//! (browser localStorage, a file, a test slot) stays out of the core.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Storage key for the progression payload
pub const STORAGE_KEY: &str = "flame_rush_progression";

/// Opaque key-value persistence surface.
pub trait ProgressStore {
    /// Read the stored payload, if any.
    fn load(&self, key: &str) -> Option<String>;
    /// Persist the payload. Failures are the store's problem; progression
    /// keeps running on the in-memory copy either way.
    fn save(&mut self, key: &str, payload: &str);
}

/// In-memory store, used headless and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<(String, String)>,
}

impl ProgressStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.slot
            .as_ref()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn save(&mut self, key: &str, payload: &str) {
        self.slot = Some((key.to_string(), payload.to_string()));
    }
}

/// Unlockable milestones
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Achievement {
    /// Collect a first flame
    FirstSpark,
    /// Collect 100 flames
    Lamplighter,
    /// Collect 500 flames
    Wildfire,
    /// Steal 10 times
    Pickpocket,
    /// Steal 50 times
    Poltergeist,
    /// Bank 250 total score
    Keeper,
    /// Bank 1000 total score
    EternalFlame,
    /// Use 10 power-ups
    Charged,
}

impl Achievement {
    const ALL: [Achievement; 8] = [
        Achievement::FirstSpark,
        Achievement::Lamplighter,
        Achievement::Wildfire,
        Achievement::Pickpocket,
        Achievement::Poltergeist,
        Achievement::Keeper,
        Achievement::EternalFlame,
        Achievement::Charged,
    ];

    fn earned(self, p: &Progression) -> bool {
        match self {
            Achievement::FirstSpark => p.flames_collected >= 1,
            Achievement::Lamplighter => p.flames_collected >= 100,
            Achievement::Wildfire => p.flames_collected >= 500,
            Achievement::Pickpocket => p.steals >= 10,
            Achievement::Poltergeist => p.steals >= 50,
            Achievement::Keeper => p.score_banked >= 250,
            Achievement::EternalFlame => p.score_banked >= 1000,
            Achievement::Charged => p.powerups_used >= 10,
        }
    }

    /// The ghost skin this achievement unlocks, if any.
    pub fn unlocks(self) -> Option<Skin> {
        match self {
            Achievement::Lamplighter => Some(Skin::Emberveil),
            Achievement::Pickpocket => Some(Skin::Shade),
            Achievement::Keeper => Some(Skin::Aurora),
            Achievement::EternalFlame => Some(Skin::Solstice),
            _ => None,
        }
    }
}

/// Cosmetic ghost skins
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Skin {
    #[default]
    Classic,
    Emberveil,
    Shade,
    Aurora,
    Solstice,
}

/// Persisted lifetime progression state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub flames_collected: u64,
    pub powerups_used: u64,
    pub steals: u64,
    /// Sum of every banked amount, across all matches
    pub score_banked: u64,
    pub matches_played: u64,
    pub unlocked: BTreeSet<Achievement>,
    pub selected_skin: Skin,
}

impl Progression {
    /// Apply one simulation event. Only player-controlled agents advance
    /// the lifetime counters; presentation hints are ignored entirely.
    /// Returns any achievements newly unlocked by the increment.
    pub fn apply(&mut self, event: &GameEvent) -> Vec<Achievement> {
        match event {
            GameEvent::FlameCollected {
                is_player: true, ..
            } => self.flames_collected += 1,
            GameEvent::PowerupCollected {
                is_player: true, ..
            } => self.powerups_used += 1,
            GameEvent::StealPerformed {
                is_player: true, ..
            } => self.steals += 1,
            GameEvent::Banked {
                is_player: true,
                amount,
                ..
            } => self.score_banked += *amount as u64,
            GameEvent::MatchEnded { .. } => self.matches_played += 1,
            _ => return Vec::new(),
        }
        self.recheck()
    }

    /// Re-evaluate every threshold; idempotent.
    fn recheck(&mut self) -> Vec<Achievement> {
        let mut fresh = Vec::new();
        for a in Achievement::ALL {
            if a.earned(self) && self.unlocked.insert(a) {
                fresh.push(a);
            }
        }
        fresh
    }

    /// Skins currently available for selection.
    pub fn available_skins(&self) -> Vec<Skin> {
        let mut skins = vec![Skin::Classic];
        skins.extend(self.unlocked.iter().filter_map(|a| a.unlocks()));
        skins
    }

    /// Select a skin; refuses ones that are still locked.
    pub fn select_skin(&mut self, skin: Skin) -> bool {
        if self.available_skins().contains(&skin) {
            self.selected_skin = skin;
            true
        } else {
            false
        }
    }
}

/// Ties a [`Progression`] to its backing store: loads once at startup and
/// writes through after every applied event.
#[derive(Debug)]
pub struct ProgressionTracker<S: ProgressStore> {
    progression: Progression,
    store: S,
}

impl<S: ProgressStore> ProgressionTracker<S> {
    /// Load persisted progression, falling back to a fresh profile on a
    /// missing or undecodable payload.
    pub fn open(store: S) -> Self {
        let progression = match store.load(STORAGE_KEY) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(p) => {
                    log::info!("Loaded progression");
                    p
                }
                Err(err) => {
                    log::warn!("Discarding corrupt progression payload: {err}");
                    Progression::default()
                }
            },
            None => Progression::default(),
        };
        Self { progression, store }
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Feed one drained simulation event through the tracker, persisting
    /// the updated counters. Returns newly unlocked achievements.
    pub fn observe(&mut self, event: &GameEvent) -> Vec<Achievement> {
        if event.is_hint() {
            return Vec::new();
        }
        let fresh = self.progression.apply(event);
        self.persist();
        fresh
    }

    /// Change the selected cosmetic, persisting on success.
    pub fn select_skin(&mut self, skin: Skin) -> bool {
        let ok = self.progression.select_skin(skin);
        if ok {
            self.persist();
        }
        ok
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.progression) {
            Ok(json) => self.store.save(STORAGE_KEY, &json),
            Err(err) => log::warn!("Failed to encode progression: {err}"),
        }
    }
}
