//! Flame Rush entry point
//!
//! Runs a headless match at a fixed timestep: every ghost (the player slot
//! included) is bot-driven, events stream into the progression tracker,
//! and the final result is reported on the log. Optional args: a run seed
//! and a tuning file path.

use std::time::{SystemTime, UNIX_EPOCH};

use flame_rush::Tuning;
use flame_rush::consts::SIM_DT_MS;
use flame_rush::progression::{MemoryStore, ProgressionTracker};
use flame_rush::sim::{MatchOutcome, MatchPhase, Team, TickInput, World, tick};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(&path),
        None => Tuning::default(),
    };

    log::info!(
        "starting match: seed {seed}, {} flames, {} bots per team, {:.0}s",
        tuning.flame_count,
        tuning.bots_per_team,
        tuning.match_duration_ms / 1000.0
    );

    let mut world = World::new(&tuning, seed);
    let mut tracker = ProgressionTracker::open(MemoryStore::default());

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    while world.phase == MatchPhase::Running {
        tick(&mut world, &input, SIM_DT_MS);
        for event in world.drain_events() {
            for achievement in tracker.observe(&event) {
                log::info!("achievement unlocked: {achievement:?}");
            }
        }
    }

    let (green, purple) = world.final_scores().unwrap_or_default();
    match world.outcome() {
        Some(MatchOutcome::Winner(Team::Green)) => {
            log::info!("Green Team wins! {green} - {purple}")
        }
        Some(MatchOutcome::Winner(Team::Purple)) => {
            log::info!("Purple Team wins! {purple} - {green}")
        }
        _ => log::info!("It's a tie! {green} - {purple}"),
    }

    let p = tracker.progression();
    log::info!(
        "player lifetime: {} flames collected, {} steals, {} banked, {} power-ups",
        p.flames_collected,
        p.steals,
        p.score_banked,
        p.powerups_used
    );
}
