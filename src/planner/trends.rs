//! Trend callouts and per-exercise trainer feedback for the daily summary

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::history::{Suggestion, is_qualifying};
use crate::config::days_before;
use crate::db::{Session, WorkoutSet};

/// Weight change (kg) worth calling out
const WEIGHT_CALLOUT_KG: f64 = 2.5;

/// Volume change (%) worth calling out
const VOLUME_CALLOUT_PCT: f64 = 15.0;

const MAX_CALLOUTS: usize = 3;

/// Sets averaged for trainer feedback
const INSIGHT_SETS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendKind {
    Weight,
    Volume,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendCallout {
    pub kind: TrendKind,
    pub exercise: String,
    /// kg for weight, percent for volume
    pub change: f64,
    pub message: String,
}

/// Per-exercise feedback from recent sessions
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerInsight {
    pub exercise: String,
    pub avg_weight_kg: f64,
    pub avg_reps: f64,
    pub suggestion: Suggestion,
}

fn qualifying_series<'a>(sessions: impl Iterator<Item = &'a Session>) -> BTreeMap<&'a str, Vec<&'a WorkoutSet>> {
    let mut ordered: Vec<&Session> = sessions.collect();
    ordered.sort_by_key(|s| s.date);

    let mut series: BTreeMap<&str, Vec<&WorkoutSet>> = BTreeMap::new();
    for session in ordered {
        for exercise in &session.exercises {
            series
                .entry(exercise.exercise_name.as_str())
                .or_default()
                .extend(exercise.sets.iter().filter(|s| is_qualifying(s)));
        }
    }
    series
}

/// Biggest first-vs-last changes across the lookback window
pub fn trend_callouts(sessions: &[Session], now: DateTime<Utc>, lookback_days: i64) -> Vec<TrendCallout> {
    let since = days_before(now, lookback_days);
    let series = qualifying_series(sessions.iter().filter(|s| s.date >= since && s.date <= now));

    let mut callouts = Vec::new();
    for (exercise, sets) in series {
        let (Some(first), Some(last)) = (sets.first(), sets.last()) else {
            continue;
        };
        if sets.len() < 2 {
            continue;
        }

        let (Some(first_weight), Some(last_weight)) = (first.weight_kg, last.weight_kg) else {
            continue;
        };
        let change = last_weight - first_weight;
        if change.abs() >= WEIGHT_CALLOUT_KG {
            let direction = if change > 0.0 { "up" } else { "down" };
            callouts.push(TrendCallout {
                kind: TrendKind::Weight,
                exercise: exercise.to_string(),
                change,
                message: format!("{} - {} {:.1} kg over time", exercise, direction, change.abs()),
            });
        }

        if let (Some(first_volume), Some(last_volume)) = (first.volume(), last.volume())
            && first_volume > 0.0
        {
            let pct = (last_volume - first_volume) / first_volume * 100.0;
            if pct.abs() > VOLUME_CALLOUT_PCT {
                let arrow = if pct > 0.0 { "↑" } else { "↓" };
                callouts.push(TrendCallout {
                    kind: TrendKind::Volume,
                    exercise: exercise.to_string(),
                    change: pct,
                    message: format!("{} volume {} {:.0}% since start", exercise, arrow, pct.abs()),
                });
            }
        }
    }

    callouts.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));
    callouts.truncate(MAX_CALLOUTS);
    callouts
}

/// Averages of the last three working sets per exercise
pub fn trainer_insights(sessions: &[Session]) -> Vec<TrainerInsight> {
    qualifying_series(sessions.iter())
        .into_iter()
        .filter_map(|(exercise, sets)| {
            let tail = &sets[sets.len().saturating_sub(INSIGHT_SETS)..];
            if tail.is_empty() {
                return None;
            }
            let n = tail.len() as f64;
            let avg_weight_kg = tail.iter().filter_map(|s| s.weight_kg).sum::<f64>() / n;
            let avg_reps = tail.iter().filter_map(|s| s.reps).map(f64::from).sum::<f64>() / n;

            let suggestion = match tail {
                [.., previous, last] if last.volume() > previous.volume() => Suggestion::Increase,
                _ => Suggestion::MaintainOrAddReps,
            };

            Some(TrainerInsight {
                exercise: exercise.to_string(),
                avg_weight_kg,
                avg_reps,
                suggestion,
            })
        })
        .collect()
}
