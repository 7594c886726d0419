//! Data-driven level rules
//!
//! Every number the engine uses to size a level comes from here so a
//! front-end can ship an easier or harder rule set without touching the sim.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PALETTE;

/// Level sizing and timing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Pairs on level 1 (one more per level after that)
    pub base_pairs: u32,
    /// Seconds on level 1
    pub base_time_limit_secs: u32,
    /// Seconds added per level
    pub time_per_level_secs: u32,
    /// Mismatch / level-complete reveal delay
    pub reveal_delay_ms: u64,
    /// Countdown period
    pub timer_period_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_pairs: BASE_PAIRS,
            base_time_limit_secs: BASE_TIME_LIMIT_SECS,
            time_per_level_secs: TIME_PER_LEVEL_SECS,
            reveal_delay_ms: REVEAL_DELAY_MS,
            timer_period_ms: TIMER_PERIOD_MS,
        }
    }
}

impl Tuning {
    /// Pairs dealt on `level` (1-based), capped at the palette size
    pub fn pairs_for_level(&self, level: u32) -> u32 {
        let pairs = self.base_pairs.saturating_add(level.saturating_sub(1));
        pairs.clamp(1, PALETTE.len() as u32)
    }

    /// Seconds on the clock for `level` (1-based), saturating at `u32::MAX`
    pub fn time_limit_for_level(&self, level: u32) -> u32 {
        let extra = level.saturating_sub(1).saturating_mul(self.time_per_level_secs);
        self.base_time_limit_secs.saturating_add(extra)
    }
}
