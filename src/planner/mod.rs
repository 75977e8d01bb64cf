//! Planner module - builds the day's routine from history and catalog
//!
//! Pipeline:
//! - History analysis (frequency, recency, progression)
//! - Split rotation (which focus is next)
//! - Exercise selection with fallback
//! - Set prescription with progressive overload

pub mod history;
pub mod selector;
pub mod sets;
pub mod split;
pub mod trends;

pub use history::{HistoryAnalysis, ProgressionRecord, Suggestion};
pub use selector::{ExerciseSelector, Selection, SelectionReason};
pub use sets::{PlannedSet, Prescription, SetKind};
pub use split::{SplitDecision, SplitReason, select_focus};

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{ExerciseTemplate, Focus, apply_exclusions, validate_catalog};
use crate::config::PlannerConfig;
use crate::db::Session;
use crate::error::{PlanError, PlanWarning};

/// Persisted between runs so an uncompleted focus gets retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    pub last_focus: String,
    pub last_scheduled_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_template_id: String,
    pub title: String,
    pub muscle_group: String,
    pub selection: SelectionReason,
    pub rest_seconds: u32,
    pub notes: String,
    pub sets: Vec<PlannedSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoutine {
    pub title: String,
    pub focus: Focus,
    pub exercises: Vec<PlannedExercise>,
    /// Exercises missing from the requested count, 0 for a full routine
    pub short_by: usize,
}

impl PlannedRoutine {
    pub fn is_complete(&self) -> bool {
        self.short_by == 0
    }
}

/// Result of one planning run
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub routine: PlannedRoutine,
    /// New rotation state for the caller to persist
    pub rotation: RotationState,
    pub split_reason: SplitReason,
    pub analysis: HistoryAnalysis,
    pub warnings: Vec<PlanWarning>,
}

/// Plan today's routine.
///
/// Pure data in, data out: history and catalog are a snapshot fetched by the
/// caller, and the returned rotation state must be persisted by it too.
/// Randomness comes only from `rng`, so a seeded generator makes runs
/// reproducible.
pub fn plan_day<R: Rng>(
    history: &[Session],
    catalog: &[ExerciseTemplate],
    rotation: Option<&RotationState>,
    config: &PlannerConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DayPlan, PlanError> {
    validate_catalog(catalog)?;

    let analysis = HistoryAnalysis::analyze(history, catalog, now, config);
    debug!(
        "Analyzed {} sessions: {} muscle groups, {} progression records, {} recent",
        history.len(),
        analysis.muscle_group_frequency.len(),
        analysis.progression.len(),
        analysis.recent_titles.len()
    );

    let decision = select_focus(rotation, &analysis, now.date_naive());
    let mut warnings: Vec<PlanWarning> = decision.warning.iter().cloned().collect();

    let available = apply_exclusions(catalog, &config.excluded_names);
    if available.len() < catalog.len() {
        debug!("Excluded {} catalog entries", catalog.len() - available.len());
    }

    let mut selector = ExerciseSelector::new(&available, &analysis.recent_titles);
    let mut blocks = Vec::new();

    let main_targets = analysis.by_ascending_frequency(decision.focus.target_groups());
    blocks.push(("main", selector.select_block("main", &main_targets, config.sets_per_focus, rng)));

    // Abs/core block is always appended unless core is the focus already
    if decision.focus != Focus::Core && config.core_block_size > 0 {
        let core_targets = analysis.by_ascending_frequency(Focus::Core.target_groups());
        blocks.push(("core", selector.select_block("core", &core_targets, config.core_block_size, rng)));
    }

    let mut exercises = Vec::new();
    let mut short_by = 0;
    for (label, block) in blocks {
        if block.short_by() > 0 {
            let warning = PlanWarning::InsufficientData {
                block: label.to_string(),
                requested: block.requested,
                selected: block.picks.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
            short_by += block.short_by();
        }
        exercises.extend(
            block
                .picks
                .iter()
                .map(|pick| plan_exercise(pick, analysis.progression.get(&pick.template.name), config)),
        );
    }

    info!(
        "Planned {} routine with {} exercises{}",
        decision.focus,
        exercises.len(),
        if short_by > 0 { format!(" ({} short)", short_by) } else { String::new() }
    );

    Ok(DayPlan {
        routine: PlannedRoutine {
            title: config.routine_title.clone(),
            focus: decision.focus,
            exercises,
            short_by,
        },
        rotation: decision.rotation,
        split_reason: decision.reason,
        analysis,
        warnings,
    })
}

fn plan_exercise(pick: &Selection, record: Option<&ProgressionRecord>, config: &PlannerConfig) -> PlannedExercise {
    let template = &pick.template;
    let mut notes = format!("{} ({}, {})", pick.reason.note(), pick.muscle_group, pick.equipment);
    if let Some(record) = record {
        notes.push_str(&format!(
            " | last {}kg x {}, {}",
            record.last_weight_kg,
            record.last_reps,
            record.suggestion.label(config.suggested_increase_pct)
        ));
    }

    PlannedExercise {
        exercise_template_id: template.id.clone(),
        title: template.name.clone(),
        muscle_group: pick.muscle_group.clone(),
        selection: pick.reason,
        rest_seconds: sets::rest_secs(template, config),
        notes,
        sets: sets::plan_sets(template, record, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    use crate::catalog::builtin_catalog;
    use crate::db::{PerformedExercise, WorkoutSet};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 7, 0, 0).unwrap()
    }

    fn small_catalog() -> Vec<ExerciseTemplate> {
        vec![
            ExerciseTemplate::new("1", "Bench Press (Barbell)", "chest", "barbell"),
            ExerciseTemplate::new("2", "Overhead Press (Dumbbell)", "shoulders", "dumbbell"),
            ExerciseTemplate::new("3", "Triceps Pushdown (Cable)", "triceps", "cable"),
            ExerciseTemplate::new("4", "Lat Pulldown (Cable)", "lats", "cable"),
            ExerciseTemplate::new("5", "Seated Row (Machine)", "upper_back", "machine"),
            ExerciseTemplate::new("6", "Bicep Curl (Dumbbell)", "biceps", "dumbbell"),
            ExerciseTemplate::new("7", "Leg Press (Machine)", "quadriceps", "machine"),
            ExerciseTemplate::new("8", "Lying Leg Curl (Machine)", "hamstrings", "machine"),
            ExerciseTemplate::new("9", "Cable Crunch", "abdominals", "cable"),
            ExerciseTemplate::new("10", "Hanging Leg Raise", "abdominals", "none"),
        ]
    }

    fn open_config() -> PlannerConfig {
        PlannerConfig { excluded_names: vec![], ..PlannerConfig::default() }
    }

    fn create_session(days_ago: i64, exercise: &str, sets: Vec<WorkoutSet>) -> Session {
        Session {
            id: format!("{}-{}", exercise, days_ago),
            date: now() - Duration::days(days_ago),
            title: "Workout".to_string(),
            exercises: vec![PerformedExercise { exercise_name: exercise.to_string(), sets }],
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2025)
    }

    /// Push scheduled yesterday and not done since
    fn push_pending() -> RotationState {
        RotationState {
            last_focus: "Push".to_string(),
            last_scheduled_date: now().date_naive() - Duration::days(1),
        }
    }

    /// What a trainee logs after doing the routine exactly as planned
    fn perform(routine: &PlannedRoutine, date: DateTime<Utc>) -> Session {
        Session {
            id: date.to_rfc3339(),
            date,
            title: routine.title.clone(),
            exercises: routine
                .exercises
                .iter()
                .map(|e| PerformedExercise {
                    exercise_name: e.title.clone(),
                    sets: e
                        .sets
                        .iter()
                        .map(|s| match s.prescription {
                            Prescription::Reps { weight_kg, reps } => {
                                WorkoutSet { weight_kg: Some(weight_kg), reps: Some(reps), is_warmup: s.is_warmup() }
                            }
                            Prescription::Hold { .. } => {
                                WorkoutSet { weight_kg: None, reps: None, is_warmup: s.is_warmup() }
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_cold_start_push_routine() {
        let config = open_config();
        let plan = plan_day(&[], &small_catalog(), None, &config, now(), &mut rng()).unwrap();

        assert_eq!(plan.routine.focus, Focus::Push);
        assert_eq!(plan.split_reason, SplitReason::ColdStart);
        assert!(plan.routine.is_complete());
        assert_eq!(plan.routine.exercises.len(), config.sets_per_focus + config.core_block_size);

        let expected = vec![
            PlannedSet { kind: SetKind::Warmup, prescription: Prescription::Reps { weight_kg: 0.0, reps: 10 } },
            PlannedSet { kind: SetKind::Normal, prescription: Prescription::Reps { weight_kg: 30.0, reps: 8 } },
            PlannedSet { kind: SetKind::Normal, prescription: Prescription::Reps { weight_kg: 30.0, reps: 8 } },
        ];
        for exercise in &plan.routine.exercises {
            assert_eq!(exercise.sets, expected, "{}", exercise.title);
        }

        let main_groups: HashSet<_> = plan.routine.exercises[..3].iter().map(|e| e.muscle_group.as_str()).collect();
        assert_eq!(main_groups, ["chest", "shoulders", "triceps"].into_iter().collect());
        assert_eq!(plan.rotation.last_focus, "Push");
        assert_eq!(plan.rotation.last_scheduled_date, now().date_naive());
    }

    #[test]
    fn test_overload_scenario_bench_press() {
        let history = vec![
            create_session(3, "Bench Press (Barbell)", vec![WorkoutSet::working(70.0, 10)]),
            create_session(2, "Bench Press (Barbell)", vec![WorkoutSet::working(100.0, 8)]),
        ];
        let plan = plan_day(&history, &small_catalog(), Some(&push_pending()), &open_config(), now(), &mut rng()).unwrap();

        assert_eq!(plan.routine.focus, Focus::Push);
        let bench = plan
            .routine
            .exercises
            .iter()
            .find(|e| e.title == "Bench Press (Barbell)")
            .unwrap();
        for set in bench.sets.iter().filter(|s| !s.is_warmup()) {
            assert_eq!(set.prescription, Prescription::Reps { weight_kg: 102.5, reps: 8 });
        }
        assert!(bench.notes.contains("increase ~5%"));
    }

    #[test]
    fn test_pull_retried_when_not_completed() {
        let history = vec![create_session(3, "Leg Press (Machine)", vec![WorkoutSet::working(100.0, 10)])];
        let rotation = RotationState {
            last_focus: "Pull".to_string(),
            last_scheduled_date: now().date_naive() - Duration::days(1),
        };
        let plan = plan_day(&history, &small_catalog(), Some(&rotation), &open_config(), now(), &mut rng()).unwrap();

        assert_eq!(plan.routine.focus, Focus::Pull);
        assert_eq!(plan.split_reason, SplitReason::Retry);
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let result = plan_day(&[], &[], None, &open_config(), now(), &mut rng());
        assert!(matches!(result, Err(PlanError::EmptyCatalog)));
    }

    #[test]
    fn test_everything_excluded_returns_empty_routine() {
        let catalog = small_catalog();
        let config = PlannerConfig {
            excluded_names: catalog.iter().map(|t| t.name.to_uppercase()).collect(),
            ..PlannerConfig::default()
        };
        let plan = plan_day(&[], &catalog, None, &config, now(), &mut rng()).unwrap();

        assert!(plan.routine.exercises.is_empty());
        assert_eq!(plan.routine.short_by, config.sets_per_focus + config.core_block_size);
        assert_eq!(plan.warnings.len(), 2);
    }

    #[test]
    fn test_denylist_never_selected() {
        let config = PlannerConfig::default();
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let history = vec![create_session(5, "Lat Pulldown (Cable)", vec![WorkoutSet::working(50.0, 10)])];
            let plan = plan_day(&history, &builtin_catalog(), None, &config, now(), &mut rng).unwrap();
            assert_eq!(plan.routine.focus, Focus::Pull);
            for exercise in &plan.routine.exercises {
                assert!(!config.excluded_names.contains(&exercise.title), "{} selected", exercise.title);
            }
        }
    }

    #[test]
    fn test_core_focus_has_no_extra_core_block() {
        let history = vec![create_session(5, "Cable Crunch", vec![WorkoutSet::working(30.0, 12)])];
        let config = open_config();
        let plan = plan_day(&history, &builtin_catalog(), None, &config, now(), &mut rng()).unwrap();

        assert_eq!(plan.routine.focus, Focus::Core);
        assert_eq!(plan.routine.exercises.len(), config.sets_per_focus);
    }

    #[test]
    fn test_no_duplicate_exercises() {
        for seed in 0..25 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let plan = plan_day(&[], &small_catalog(), None, &open_config(), now(), &mut rng).unwrap();
            let names: HashSet<_> = plan.routine.exercises.iter().map(|e| e.title.clone()).collect();
            assert_eq!(names.len(), plan.routine.exercises.len());
        }
    }

    #[test]
    fn test_same_seed_same_routine() {
        let history = vec![
            create_session(4, "Bench Press (Barbell)", vec![WorkoutSet::working(60.0, 8)]),
            create_session(2, "Leg Press (Machine)", vec![WorkoutSet::working(100.0, 10)]),
        ];
        let rotation = RotationState {
            last_focus: "Legs".to_string(),
            last_scheduled_date: now().date_naive() - Duration::days(2),
        };
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            plan_day(&history, &builtin_catalog(), Some(&rotation), &open_config(), now(), &mut rng).unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.routine, b.routine);
        assert_eq!(a.rotation, b.rotation);
    }

    #[test]
    fn test_stale_rotation_reported() {
        let rotation = RotationState {
            last_focus: "Arms".to_string(),
            last_scheduled_date: now().date_naive(),
        };
        let plan = plan_day(&[], &small_catalog(), Some(&rotation), &open_config(), now(), &mut rng()).unwrap();
        assert_eq!(plan.routine.focus, Focus::Push);
        assert!(plan.warnings.contains(&PlanWarning::StaleRotation { last_focus: "Arms".to_string() }));
    }

    #[test]
    fn test_recent_exercise_skipped_when_alternative_exists() {
        let history = vec![create_session(0, "Bench Press (Barbell)", vec![WorkoutSet::working(60.0, 8)])];
        let rotation = RotationState {
            last_focus: "Push".to_string(),
            last_scheduled_date: now().date_naive() + Duration::days(1),
        };
        let plan = plan_day(&history, &builtin_catalog(), Some(&rotation), &open_config(), now(), &mut rng()).unwrap();

        assert_eq!(plan.routine.focus, Focus::Push);
        assert!(plan.routine.exercises.iter().all(|e| e.title != "Bench Press (Barbell)"));
    }

    #[test]
    fn test_overload_across_multi_set_sessions() {
        let history = vec![
            create_session(3, "Bench Press (Barbell)", vec![WorkoutSet::working(95.0, 8); 3]),
            create_session(2, "Bench Press (Barbell)", vec![WorkoutSet::working(100.0, 8); 3]),
        ];
        let plan = plan_day(&history, &small_catalog(), Some(&push_pending()), &open_config(), now(), &mut rng()).unwrap();

        let bench = plan.routine.exercises.iter().find(|e| e.title == "Bench Press (Barbell)").unwrap();
        let working: Vec<_> = bench.sets.iter().filter(|s| !s.is_warmup()).map(|s| s.prescription).collect();
        assert_eq!(working, vec![Prescription::Reps { weight_kg: 102.5, reps: 8 }; 3]);
    }

    #[test]
    fn test_rotation_follows_completed_days() {
        let catalog = builtin_catalog();
        let config = PlannerConfig::default();
        let mut history = Vec::new();
        let mut rotation: Option<RotationState> = None;
        let mut foci = Vec::new();

        for day in 0..8 {
            let today = now() + Duration::days(day);
            let mut rng = ChaCha8Rng::seed_from_u64(day as u64);
            let plan = plan_day(&history, &catalog, rotation.as_ref(), &config, today, &mut rng).unwrap();

            assert_ne!(plan.split_reason, SplitReason::Retry, "day {} was completed", day);
            history.push(perform(&plan.routine, today + Duration::hours(2)));
            rotation = Some(plan.rotation);
            foci.push(plan.routine.focus);
        }

        assert_eq!(foci[..3], [Focus::Push, Focus::Pull, Focus::Legs]);
        let distinct: HashSet<_> = foci.iter().collect();
        assert!(distinct.len() >= 3, "{:?}", foci);
    }

    #[test]
    fn test_skipped_day_is_retried_then_rotation_resumes() {
        let catalog = builtin_catalog();
        let config = PlannerConfig::default();

        let day_one = plan_day(&[], &catalog, None, &config, now(), &mut rng()).unwrap();
        assert_eq!(day_one.routine.focus, Focus::Push);

        // Nothing logged on day one
        let day_two = plan_day(&[], &catalog, Some(&day_one.rotation), &config, now() + Duration::days(1), &mut rng())
            .unwrap();
        assert_eq!(day_two.routine.focus, Focus::Push);
        assert_eq!(day_two.split_reason, SplitReason::Retry);

        let history = vec![perform(&day_two.routine, now() + Duration::days(1) + Duration::hours(2))];
        let day_three = plan_day(
            &history,
            &catalog,
            Some(&day_two.rotation),
            &config,
            now() + Duration::days(2),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(day_three.routine.focus, Focus::Pull);
    }
}
