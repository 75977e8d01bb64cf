//! Planner tuning constants

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_EXCLUDED;

/// Title the daily routine is published under
pub const DEFAULT_ROUTINE_TITLE: &str = "Autocoach Daily Workout";

/// Everything a planning run can be tuned with.
///
/// Recency window, overload increment and cold-start loads have drifted
/// between versions of this planner, so none of them are hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Names removed from the catalog before selection (case-insensitive)
    pub excluded_names: Vec<String>,
    /// History window for frequency and progression
    pub lookback_days: i64,
    /// Main-block exercise count
    pub sets_per_focus: usize,
    /// Secondary abs/core block size
    pub core_block_size: usize,
    /// Exercises performed within this many hours are avoided
    pub recency_hours: i64,
    pub overload_increment_kg: f64,
    /// Percentage quoted in the "increase" suggestion
    pub suggested_increase_pct: f64,
    /// Reps at which progression moves to weight instead of reps
    pub rep_ceiling: u32,
    pub min_reps: u32,
    pub max_reps: u32,
    pub working_sets: usize,
    pub cold_start_working_sets: usize,
    pub cold_start_weight_kg: f64,
    pub cold_start_reps: u32,
    pub warmup_reps: u32,
    /// Warm-up weight as a fraction of the working weight
    pub warmup_ratio: f64,
    pub hold_secs: u32,
    pub rest_secs: u32,
    pub core_rest_secs: u32,
    pub routine_title: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            excluded_names: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            lookback_days: 30,
            sets_per_focus: 4,
            core_block_size: 3,
            recency_hours: 24,
            overload_increment_kg: 2.5,
            suggested_increase_pct: 5.0,
            rep_ceiling: 10,
            min_reps: 6,
            max_reps: 12,
            working_sets: 3,
            cold_start_working_sets: 2,
            cold_start_weight_kg: 30.0,
            cold_start_reps: 8,
            warmup_reps: 10,
            warmup_ratio: 0.5,
            hold_secs: 45,
            rest_secs: 90,
            core_rest_secs: 60,
            routine_title: DEFAULT_ROUTINE_TITLE.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Start of the lookback window
    pub fn lookback_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        days_before(now, self.lookback_days)
    }

    /// Start of the recency window
    pub fn recency_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_hours(self.recency_hours)
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Replace the denylist with a comma-separated list
    pub fn with_excluded(mut self, list: &str) -> Self {
        self.excluded_names = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self
    }
}

/// `now` minus whole days, clamped to the earliest representable time
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
