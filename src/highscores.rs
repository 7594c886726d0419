//! High score leaderboard system
//!
//! Persisted through a [`KeyValueStore`], tracks the top 10 sessions ranked
//! by level cleared, most recent first on ties.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::consts::{HIGH_SCORES_KEY, MAX_HIGH_SCORES};
use crate::error::PersistenceError;
use crate::persistence::{self, KeyValueStore};

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player's name
    pub name: String,
    /// Highest level cleared
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl ScoreRecord {
    /// Leaderboard order: level descending, then newest first
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .cmp(&self.level)
            .then_with(|| other.timestamp.total_cmp(&self.timestamp))
    }
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<ScoreRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary records, sorted and trimmed
    pub fn from_entries(mut entries: Vec<ScoreRecord>) -> Self {
        entries.sort_by(ScoreRecord::rank_cmp);
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a fresh record at `level` would make the board
    ///
    /// A fresh record is the newest, so it beats older entries at the same level.
    pub fn qualifies(&self, level: u32) -> bool {
        if level == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| level >= e.level).unwrap_or(true)
    }

    /// Get the rank a fresh record would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, level: u32) -> Option<usize> {
        if !self.qualifies(level) {
            return None;
        }
        let rank = self.entries.iter().position(|e| level >= e.level);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a record, re-sort and trim
    ///
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn insert(&mut self, record: ScoreRecord) -> Option<usize> {
        // Insert before the first entry it outranks so ties keep arrival order
        let pos = self
            .entries
            .iter()
            .position(|e| record.rank_cmp(e) == Ordering::Less)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the best level (if any)
    pub fn top_level(&self) -> Option<u32> {
        self.entries.first().map(|e| e.level)
    }
}

/// Leaderboard bound to its backing store
#[derive(Debug)]
pub struct ScoreStore<S: KeyValueStore> {
    store: S,
    scores: HighScores,
}

impl<S: KeyValueStore> ScoreStore<S> {
    /// Wrap a store without reading it yet
    pub fn new(store: S) -> Self {
        Self {
            store,
            scores: HighScores::new(),
        }
    }

    /// Wrap a store and load whatever it holds
    pub fn open(store: S) -> Self {
        let mut scores = Self::new(store);
        scores.load();
        scores
    }

    /// Read the persisted leaderboard without touching the cached copy
    pub fn try_load(&self) -> Result<HighScores, PersistenceError> {
        let entries: Option<Vec<ScoreRecord>> = persistence::load_json(&self.store, HIGH_SCORES_KEY)?;
        Ok(HighScores::from_entries(entries.unwrap_or_default()))
    }

    /// Load high scores, falling back to an empty board on any failure
    pub fn load(&mut self) -> &[ScoreRecord] {
        self.scores = match self.try_load() {
            Ok(scores) if scores.is_empty() => {
                log::info!("No high scores found, starting fresh");
                scores
            }
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.len());
                scores
            }
            Err(e) => {
                log::error!("Error loading high scores: {}", e);
                HighScores::new()
            }
        };
        &self.scores.entries
    }

    /// Merge a record, persist, and return the updated board
    ///
    /// A failed write is logged; the in-memory board is still updated.
    pub fn submit(&mut self, record: ScoreRecord) -> &[ScoreRecord] {
        match self.scores.insert(record) {
            Some(rank) => log::info!("New high score at rank {}", rank),
            None => log::debug!("Score did not make the top {}", MAX_HIGH_SCORES),
        }
        if let Err(e) = self.save() {
            log::error!("Error saving high scores: {}", e);
        }
        &self.scores.entries
    }

    /// Write the current board to the store
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        persistence::save_json(&mut self.store, HIGH_SCORES_KEY, &self.scores)?;
        log::info!("High scores saved ({} entries)", self.scores.len());
        Ok(())
    }

    pub fn entries(&self) -> &[ScoreRecord] {
        &self.scores.entries
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

const MS_PER_MIN: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MIN;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_ms = (now - timestamp).max(0.0);
    let diff_mins = diff_ms / MS_PER_MIN;
    let diff_hours = diff_ms / MS_PER_HOUR;
    let diff_days = diff_ms / MS_PER_DAY;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            absolute_date(timestamp)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// `M/D/YY` in the browser's local time zone
#[cfg(target_arch = "wasm32")]
fn absolute_date(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    format!(
        "{}/{}/{:02}",
        date.get_month() + 1,
        date.get_date(),
        date.get_full_year() % 100
    )
}

/// `M/D/YY` in UTC (no time zone database natively)
#[cfg(not(target_arch = "wasm32"))]
fn absolute_date(timestamp: f64) -> String {
    let (year, month, day) = civil_from_days((timestamp / MS_PER_DAY).floor() as i64);
    format!("{}/{}/{:02}", month, day, year.rem_euclid(100))
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian, UTC
#[cfg(not(target_arch = "wasm32"))]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
