//! Memory Maestro - a memory-matching card game
//!
//! Core modules:
//! - `sim`: Deterministic game engine (board, matching, level timer)
//! - `highscores`: Top 10 leaderboard backed by a key-value store
//! - `persistence`: Key-value storage back-ends (memory, file, LocalStorage)
//! - `settings`: Player preferences (theme, card back colour)
//! - `tuning`: Data-driven level rules
//! - `app`: Screen flow and snapshots for a front-end
//! - `platform`: Browser/native differences (clock, seeding, web bridge)

pub mod app;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::{App, AppSnapshot, Modal, Screen, UiEvent};
pub use error::{PersistenceError, ValidationError};
pub use highscores::{HighScores, ScoreRecord, ScoreStore};
pub use persistence::{KeyValueStore, MemoryStore};
pub use settings::{CardBackColor, Settings, Theme};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Pairs dealt on level 1
    pub const BASE_PAIRS: u32 = 2;
    /// Seconds on the clock for level 1
    pub const BASE_TIME_LIMIT_SECS: u32 = 12;
    /// Extra seconds granted per level
    pub const TIME_PER_LEVEL_SECS: u32 = 4;

    /// How long a mismatch or the final match stays visible
    pub const REVEAL_DELAY_MS: u64 = 1000;
    /// Countdown period
    pub const TIMER_PERIOD_MS: u64 = 1000;

    /// Leaderboard size
    pub const MAX_HIGH_SCORES: usize = 10;

    /// Storage keys
    pub const HIGH_SCORES_KEY: &str = "memoryMatchHighScores";
    pub const SETTINGS_KEY: &str = "memoryMatchSettings";
}
