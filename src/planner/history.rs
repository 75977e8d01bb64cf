//! Training history analysis - muscle group frequency, recency and progression

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ExerciseTemplate, find_template_by_name, normalize};
use crate::config::PlannerConfig;
use crate::db::{Session, WorkoutSet};

/// What to do with an exercise next time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    /// Add load (~5%)
    Increase,
    /// Hold the weight, chase reps
    MaintainOrAddReps,
}

impl Suggestion {
    pub fn label(&self, increase_pct: f64) -> String {
        match self {
            Suggestion::Increase => format!("increase ~{:.0}%", increase_pct),
            Suggestion::MaintainOrAddReps => "maintain/increase reps".to_string(),
        }
    }
}

/// Trend between the last qualifying sets of the two most recent sessions with an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub last_weight_kg: f64,
    pub last_reps: u32,
    pub last_volume: f64,
    pub previous_volume: f64,
    /// last_volume - previous_volume
    pub volume_change: f64,
    pub suggestion: Suggestion,
}

impl ProgressionRecord {
    fn from_pair(previous: &WorkoutSet, last: &WorkoutSet, rep_ceiling: u32) -> Option<Self> {
        let previous_volume = previous.volume()?;
        let last_volume = last.volume()?;
        let last_weight_kg = last.weight_kg?;
        let last_reps = last.reps?;
        let volume_change = last_volume - previous_volume;

        // At the rep ceiling progress comes from weight, not more reps
        let suggestion = if volume_change > 0.0 || last_reps >= rep_ceiling {
            Suggestion::Increase
        } else {
            Suggestion::MaintainOrAddReps
        };

        Some(Self {
            last_weight_kg,
            last_reps,
            last_volume,
            previous_volume,
            volume_change,
            suggestion,
        })
    }

    pub fn overload_triggered(&self) -> bool {
        self.volume_change > 0.0
    }
}

/// Derived view of the history, recomputed every run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryAnalysis {
    /// Exercises performed inside the recency window
    pub recent_titles: BTreeSet<String>,
    /// Exercise occurrences per (lower-cased) muscle group across the lookback window
    pub muscle_group_frequency: BTreeMap<String, u32>,
    pub exercise_frequency: BTreeMap<String, u32>,
    pub progression: BTreeMap<String, ProgressionRecord>,
    /// Occurrences of exercises missing from the catalog
    pub unknown_exercises: u32,
    /// Most recent completed session, regardless of window
    pub last_session_date: Option<DateTime<Utc>>,
}

impl HistoryAnalysis {
    /// Build analysis from session history
    pub fn analyze(
        sessions: &[Session],
        catalog: &[ExerciseTemplate],
        now: DateTime<Utc>,
        config: &PlannerConfig,
    ) -> Self {
        let window_start = config.lookback_start(now);
        let recent_start = config.recency_start(now);

        let mut ordered: Vec<&Session> = sessions.iter().filter(|s| s.date <= now).collect();
        ordered.sort_by_key(|s| s.date);

        let mut analysis = HistoryAnalysis {
            last_session_date: ordered.last().map(|s| s.date),
            ..Default::default()
        };
        let mut series: BTreeMap<&str, Vec<&WorkoutSet>> = BTreeMap::new();

        for session in ordered.iter().filter(|s| s.date >= window_start) {
            let is_recent = session.date >= recent_start;
            let mut session_last: BTreeMap<&str, &WorkoutSet> = BTreeMap::new();

            for exercise in &session.exercises {
                let name = exercise.exercise_name.as_str();
                *analysis.exercise_frequency.entry(name.to_string()).or_insert(0) += 1;

                if is_recent {
                    analysis.recent_titles.insert(name.to_string());
                }

                match find_template_by_name(catalog, name) {
                    Some(template) => {
                        *analysis
                            .muscle_group_frequency
                            .entry(normalize(&template.primary_muscle_group))
                            .or_insert(0) += 1;
                    }
                    None => analysis.unknown_exercises += 1,
                }

                if let Some(set) = exercise.sets.iter().rev().find(|s| is_qualifying(s)) {
                    session_last.insert(name, set);
                }
            }

            // One point per session
            for (name, set) in session_last {
                series.entry(name).or_default().push(set);
            }
        }

        for (name, sets) in series {
            if let [.., previous, last] = sets.as_slice()
                && let Some(record) = ProgressionRecord::from_pair(previous, last, config.rep_ceiling)
            {
                analysis.progression.insert(name.to_string(), record);
            }
        }

        analysis
    }

    pub fn frequency_of(&self, group: &str) -> u32 {
        self.muscle_group_frequency
            .get(&normalize(group))
            .copied()
            .unwrap_or(0)
    }

    /// Order groups by ascending trained frequency (stable on input order)
    pub fn by_ascending_frequency(&self, groups: &[&str]) -> Vec<String> {
        let mut ordered: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        ordered.sort_by_key(|g| self.frequency_of(g));
        ordered
    }
}

/// Working set with both weight and reps present
pub fn is_qualifying(set: &WorkoutSet) -> bool {
    !set.is_warmup && set.weight_kg.is_some() && set.reps.is_some()
}
