//! Set prescription - warm-up plus working sets with progressive overload

use serde::{Deserialize, Serialize};

use super::history::ProgressionRecord;
use crate::catalog::{ExerciseTemplate, is_core_group};
use crate::config::PlannerConfig;

/// Names that mark a timed hold
const HOLD_KEYWORDS: &[&str] = &["plank", "hold", "wall sit", "hollow body", "l-sit", "dead hang"];

/// Names that mark a rep-based movement even without equipment
const REP_KEYWORDS: &[&str] = &[
    "crunch", "raise", "twist", "sit-up", "sit up", "roll", "curl", "rotation", "chop", "v-up",
    "flutter", "wheel", "bicycle", "tuck",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    Warmup,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prescription {
    Reps { weight_kg: f64, reps: u32 },
    Hold { duration_secs: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedSet {
    pub kind: SetKind,
    pub prescription: Prescription,
}

impl PlannedSet {
    fn reps(kind: SetKind, weight_kg: f64, reps: u32) -> Self {
        Self { kind, prescription: Prescription::Reps { weight_kg: weight_kg.max(0.0), reps } }
    }

    fn hold(kind: SetKind, duration_secs: u32) -> Self {
        Self { kind, prescription: Prescription::Hold { duration_secs } }
    }

    pub fn is_warmup(&self) -> bool {
        self.kind == SetKind::Warmup
    }

    /// Short form, e.g. "32.5kg x 8" or "45s"
    pub fn describe(&self) -> String {
        match self.prescription {
            Prescription::Reps { weight_kg, reps } => format!("{}kg x {}", weight_kg, reps),
            Prescription::Hold { duration_secs } => format!("{}s", duration_secs),
        }
    }
}

/// Isometric holds are prescribed by time instead of weight × reps
pub fn is_isometric(template: &ExerciseTemplate) -> bool {
    let name = template.name.to_lowercase();
    if HOLD_KEYWORDS.iter().any(|k| name.contains(k)) {
        return true;
    }
    template.is_bodyweight()
        && is_core_group(&template.primary_muscle_group)
        && !REP_KEYWORDS.iter().any(|k| name.contains(k))
}

pub fn rest_secs(template: &ExerciseTemplate, config: &PlannerConfig) -> u32 {
    if is_isometric(template) || is_core_group(&template.primary_muscle_group) {
        config.core_rest_secs
    } else {
        config.rest_secs
    }
}

/// Warm-up set followed by working sets.
///
/// Without history a conservative default load is used. With history the
/// last weight goes up by the overload increment when the last session's
/// volume beat the session before it; reps stay where they were, inside the
/// rep range.
pub fn plan_sets(
    template: &ExerciseTemplate,
    record: Option<&ProgressionRecord>,
    config: &PlannerConfig,
) -> Vec<PlannedSet> {
    let working = if record.is_some() {
        config.working_sets
    } else {
        config.cold_start_working_sets
    };

    if is_isometric(template) {
        let mut sets = vec![PlannedSet::hold(SetKind::Warmup, config.hold_secs / 2)];
        sets.extend((0..working).map(|_| PlannedSet::hold(SetKind::Normal, config.hold_secs)));
        return sets;
    }

    let Some(record) = record else {
        let mut sets = vec![PlannedSet::reps(SetKind::Warmup, 0.0, config.warmup_reps)];
        sets.extend((0..working).map(|_| {
            PlannedSet::reps(SetKind::Normal, config.cold_start_weight_kg, config.cold_start_reps)
        }));
        return sets;
    };

    let weight = if record.overload_triggered() {
        record.last_weight_kg + config.overload_increment_kg
    } else {
        record.last_weight_kg
    }
    .max(0.0);
    let reps = record.last_reps.clamp(config.min_reps, config.max_reps);

    let mut sets = vec![PlannedSet::reps(
        SetKind::Warmup,
        round_down(weight * config.warmup_ratio, config.overload_increment_kg),
        config.warmup_reps,
    )];
    sets.extend((0..working).map(|_| PlannedSet::reps(SetKind::Normal, weight, reps)));
    sets
}

/// Round down to the nearest plate step
fn round_down(weight: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return weight.max(0.0);
    }
    ((weight / step).floor() * step).max(0.0)
}
