//! Planning runs against the local store, shared by the CLI and the bot

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::catalog::{ExerciseTemplate, builtin_catalog};
use crate::config::PlannerConfig;
use crate::db::{self, Database};
use crate::error::CoachError;
use crate::planner::{DayPlan, plan_day};
use crate::summary::build_summary;

/// Seeded generator when a seed is given, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Imported catalog, or the built-in one when nothing was imported
pub fn load_catalog(db: &Database) -> db::Result<Vec<ExerciseTemplate>> {
    let catalog = db.get_catalog()?;
    if catalog.is_empty() {
        info!("No imported catalog, using built-in exercises");
        return Ok(builtin_catalog());
    }
    Ok(catalog)
}

/// Plan today's routine from stored history.
///
/// Unless `dry_run` is set the new rotation state is saved and the routine
/// is published, replacing the previous one with the same title.
pub fn plan_from_store<R: Rng>(
    db: &Database,
    config: &PlannerConfig,
    now: DateTime<Utc>,
    rng: &mut R,
    dry_run: bool,
) -> Result<DayPlan, CoachError> {
    let history = db.get_sessions_since(config.lookback_start(now))?;
    let catalog = load_catalog(db)?;
    let rotation = db.load_rotation()?;

    let plan = plan_day(&history, &catalog, rotation.as_ref(), config, now, rng)?;

    if dry_run {
        info!("Dry run, rotation and routine not saved");
        return Ok(plan);
    }

    db.save_rotation(&plan.rotation)?;
    let updated = db.publish_routine(&plan.routine)?;
    info!(
        "{} routine '{}'",
        if updated { "Updated" } else { "Created" },
        plan.routine.title
    );
    Ok(plan)
}

/// Summary text for the stored history and the latest published routine
pub fn daily_summary(db: &Database, config: &PlannerConfig, now: DateTime<Utc>) -> db::Result<String> {
    let history = db.get_sessions_since(config.lookback_start(now))?;
    let routine = db.latest_routine()?;
    Ok(build_summary(
        &history,
        routine.as_ref(),
        now,
        config.lookback_days,
        config.suggested_increase_pct,
    ))
}
