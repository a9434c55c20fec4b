//! High score leaderboard
//!
//! One board per mode, ordered by survival time (longest first). Ties keep
//! insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::sim::Mode;

/// A finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub mode: Mode,
    /// Seconds survived
    pub survival_time: f32,
    /// Projectiles dodged
    pub dodges: u32,
}

impl ScoreRecord {
    pub fn new(mode: Mode, survival_time: f32, dodges: u32) -> Self {
        Self {
            mode,
            survival_time,
            dodges,
        }
    }
}

/// Persistent per-mode leaderboard storage
pub trait LeaderboardStore {
    /// Append one record to `mode`'s board
    fn append(&mut self, mode: Mode, record: ScoreRecord) -> Result<(), StoreError>;

    /// Up to `n` records of `mode`, longest survival first
    fn load_top(&self, mode: Mode, n: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Sort a board longest-survival first, keeping insertion order on ties
pub fn rank(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.survival_time.total_cmp(&a.survival_time));
}

/// Leaderboard kept in memory, for tests and sessions without storage
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    boards: BTreeMap<Mode, Vec<ScoreRecord>>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored for `mode`
    pub fn len(&self, mode: Mode) -> usize {
        self.boards.get(&mode).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn append(&mut self, mode: Mode, record: ScoreRecord) -> Result<(), StoreError> {
        self.boards
            .entry(mode)
            .or_default()
            .push(ScoreRecord { mode, ..record });
        Ok(())
    }

    fn load_top(&self, mode: Mode, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records = self.boards.get(&mode).cloned().unwrap_or_default();
        rank(&mut records);
        records.truncate(n);
        Ok(records)
    }
}

/// Format seconds for display, e.g. `83.4` -> `"1:23.4"`
pub fn format_seconds(seconds: f32) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let minutes = tenths / 600;
    let rest = tenths % 600;
    if minutes > 0 {
        format!("{}:{:02}.{}", minutes, rest / 10, rest % 10)
    } else {
        format!("{}.{}s", rest / 10, rest % 10)
    }
}
