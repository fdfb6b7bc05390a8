//! Per-level leaderboard of verified runs
//!
//! Entries are sorted by completion time, fastest first. A run only gets on the
//! board after its replay has been re-simulated and reaches the goal.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ReplayError};
use crate::level::Level;
use crate::persistence;
use crate::replay::Replay;
use crate::sim::World;
use crate::tuning::Tuning;

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    /// Completion time in seconds
    pub time: f32,
    /// Unix seconds when the run was recorded
    pub created: i32,
    pub alt: bool,
    /// Base64 replay, so the run can be watched
    pub replay: String,
}

impl LeaderboardEntry {
    pub fn replay(&self) -> Result<Replay, ReplayError> {
        Replay::deserialize_b64(&self.replay)
    }
}

/// Step a playback world until it wins, dies, or uses up `frames` ticks
///
/// Events are dropped every tick; nobody listens during verification.
fn play_through(world: &mut World, frames: usize) {
    for _ in 0..frames {
        world.step();
        world.drain_events();
        if world.won() || world.lost() {
            return;
        }
    }
}

/// Re-simulate a replay on a level
///
/// Returns the completion time in seconds if the goal is reached within the
/// recorded frames without dying.
pub fn verify(level: &Level, replay: &Replay, tuning: &Tuning) -> Option<f32> {
    let frames = replay.recorded_len();
    let mut world = World::new(level, tuning.clone()).with_playback(replay.clone());
    play_through(&mut world, frames);

    if world.won() {
        return world.finish_time();
    }
    if world.lost() {
        log::info!("Replay by '{}' dies at tick {}", replay.user(), world.steps());
    } else {
        log::info!(
            "Replay by '{}' ends after {} ticks without reaching the goal",
            replay.user(),
            frames
        );
    }
    None
}

/// Best runs on one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub level_id: i32,
    pub entries: Vec<LeaderboardEntry>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(-1)
    }
}

impl Leaderboard {
    pub fn new(level_id: i32) -> Self {
        Self {
            level_id,
            entries: Vec::new(),
        }
    }

    /// Index a finish time would be stored at; equal times go after
    /// the runs already on the board
    fn slot_for(&self, time: f32) -> usize {
        self.entries.partition_point(|e| e.time <= time)
    }

    /// Whether a verified finish time is fast enough to be listed
    ///
    /// Non-finite and non-positive times never are.
    pub fn qualifies(&self, time: f32) -> bool {
        time.is_finite() && time > 0.0 && self.slot_for(time) < MAX_ENTRIES
    }

    /// 1-based place a verified finish time would take
    pub fn potential_rank(&self, time: f32) -> Option<usize> {
        self.qualifies(time).then(|| self.slot_for(time) + 1)
    }

    /// Re-simulate a replay and list it if it finishes fast enough
    ///
    /// Each user keeps only their fastest run. Returns the place the run
    /// took, or None if it was rejected by verification or too slow.
    pub fn submit(&mut self, level: &Level, replay: &Replay, tuning: &Tuning) -> Option<usize> {
        if replay.level_id() != self.level_id || level.id() != self.level_id {
            log::warn!(
                "Replay for level {} submitted to the board of level {}",
                replay.level_id(),
                self.level_id
            );
            return None;
        }

        let time = verify(level, replay, tuning)?;

        if let Some(i) = self.entries.iter().position(|e| e.user == replay.user()) {
            if self.entries[i].time <= time {
                return None;
            }
            self.entries.remove(i);
        }
        if !self.qualifies(time) {
            return None;
        }

        let slot = self.slot_for(time);
        self.entries.insert(
            slot,
            LeaderboardEntry {
                user: replay.user().to_string(),
                time,
                created: replay.created(),
                alt: replay.alt(),
                replay: replay.serialize_b64(),
            },
        );
        self.entries.truncate(MAX_ENTRIES);

        log::info!("'{}' placed #{} with {:.2}s", replay.user(), slot + 1, time);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_time(&self) -> Option<f32> {
        self.entries.first().map(|e| e.time)
    }

    pub fn entry_for(&self, user: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.user == user)
    }

    pub fn load(path: &Path) -> Self {
        persistence::load_json_or_default(path, "leaderboard")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        persistence::save_json(path, self)
    }
}
