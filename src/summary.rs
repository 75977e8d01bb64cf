//! Daily summary - yesterday's training, feedback, trends and today's routine

use chrono::{DateTime, Duration, Utc};

use crate::db::Session;
use crate::planner::history::is_qualifying;
use crate::planner::trends::{TrainerInsight, trainer_insights, trend_callouts};
use crate::planner::{PlannedRoutine, SetKind};
use crate::quotes::{format_quote, quote_of_day};

const REST_DAY_FEEDBACK: &str =
    "Rest day - no exercise trends to analyze. Use today to prepare for tomorrow's push.";

/// One line per exercise with warm-up and working sets
pub fn format_routine(routine: &PlannedRoutine) -> String {
    let mut lines = vec![format!("{} {} - {}", routine.focus.emoji(), routine.focus, routine.title)];

    for (i, exercise) in routine.exercises.iter().enumerate() {
        let warmup: Vec<String> = exercise
            .sets
            .iter()
            .filter(|s| s.kind == SetKind::Warmup)
            .map(|s| s.describe())
            .collect();
        let working: Vec<String> = exercise
            .sets
            .iter()
            .filter(|s| s.kind == SetKind::Normal)
            .map(|s| s.describe())
            .collect();

        lines.push(format!(
            "{}. {} - warm-up {} | {} | rest {}s",
            i + 1,
            exercise.title,
            warmup.join(", "),
            working.join(", "),
            exercise.rest_seconds
        ));
        lines.push(format!("   {}", exercise.notes));
    }

    if !routine.is_complete() {
        lines.push(format!("Could not fill {} slot(s) from the catalog.", routine.short_by));
    }
    lines.join("\n")
}

fn format_insight(insight: &TrainerInsight, increase_pct: f64) -> String {
    format!(
        "• {}: {} (avg {:.1} reps @ {:.1} kg)",
        insight.exercise,
        insight.suggestion.label(increase_pct),
        insight.avg_reps,
        insight.avg_weight_kg
    )
}

/// Build the plain-text daily summary
pub fn build_summary(
    history: &[Session],
    routine: Option<&PlannedRoutine>,
    now: DateTime<Utc>,
    lookback_days: i64,
    increase_pct: f64,
) -> String {
    let since = now - Duration::days(1);
    let recent: Vec<Session> = history
        .iter()
        .filter(|s| s.date >= since && s.date <= now)
        .cloned()
        .collect();
    let insights = trainer_insights(&recent);

    let mut out = vec![format!("🎯 Daily Summary ({})", now.format("%Y-%m-%d")), String::new()];

    out.push("💪 Workout Summary".to_string());
    if recent.is_empty() {
        out.push("No workouts logged in the last day.".to_string());
    }
    for session in &recent {
        out.push(format!("Workout: {}", session.title));
        for exercise in &session.exercises {
            let sets: Vec<String> = exercise
                .sets
                .iter()
                .filter(|s| is_qualifying(s))
                .filter_map(|s| Some(format!("{}kg x {}", s.weight_kg?, s.reps?)))
                .collect();
            if sets.is_empty() {
                continue;
            }
            let note = insights
                .iter()
                .find(|i| i.exercise == exercise.exercise_name)
                .map(|i| i.suggestion.label(increase_pct))
                .unwrap_or_else(|| "Maintain form and consistency".to_string());
            out.push(format!("  {}: {}", exercise.exercise_name, sets.join(", ")));
            out.push(format!("    Note: {}", note));
        }
    }
    out.push(String::new());

    out.push("🧠 Trainer Feedback".to_string());
    if insights.is_empty() {
        out.push(REST_DAY_FEEDBACK.to_string());
    } else {
        out.extend(insights.iter().map(|i| format_insight(i, increase_pct)));
    }
    out.push(String::new());

    out.push("📈 Trends".to_string());
    let callouts = trend_callouts(history, now, lookback_days);
    if callouts.is_empty() {
        out.push("No notable trends yet.".to_string());
    } else {
        out.extend(callouts.iter().map(|c| format!("• {}", c.message)));
    }
    out.push(String::new());

    out.push("📅 What's Next".to_string());
    match routine {
        Some(routine) => out.push(format_routine(routine)),
        None => out.push("No routine planned yet.".to_string()),
    }
    out.push(String::new());

    out.push("💡 Quote of the Day".to_string());
    out.push(format_quote(quote_of_day(now.date_naive())));

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::catalog::builtin_catalog;
    use crate::config::PlannerConfig;
    use crate::db::{PerformedExercise, WorkoutSet};
    use crate::planner::plan_day;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 7, 0, 0).unwrap()
    }

    fn session(hours_ago: i64, title: &str, exercise: &str, sets: Vec<WorkoutSet>) -> Session {
        Session {
            id: format!("{}", hours_ago),
            date: now() - Duration::hours(hours_ago),
            title: title.to_string(),
            exercises: vec![PerformedExercise { exercise_name: exercise.to_string(), sets }],
        }
    }

    fn routine() -> PlannedRoutine {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        plan_day(&[], &builtin_catalog(), None, &PlannerConfig::default(), now(), &mut rng)
            .unwrap()
            .routine
    }

    #[test]
    fn test_rest_day_summary() {
        let text = build_summary(&[], None, now(), 30, 5.0);
        assert!(text.contains("Daily Summary (2025-04-10)"));
        assert!(text.contains("No workouts logged"));
        assert!(text.contains(REST_DAY_FEEDBACK));
        assert!(text.contains("No routine planned yet."));
        assert!(text.contains("Quote of the Day"));
    }

    #[test]
    fn test_summary_lists_recent_workout_and_feedback() {
        let history = vec![session(
            12,
            "Push Day",
            "Bench Press (Barbell)",
            vec![WorkoutSet::working(60.0, 8), WorkoutSet::working(62.5, 8)],
        )];
        let text = build_summary(&history, None, now(), 30, 5.0);

        assert!(text.contains("Workout: Push Day"));
        assert!(text.contains("Bench Press (Barbell): 60kg x 8, 62.5kg x 8"));
        assert!(text.contains("• Bench Press (Barbell): increase ~5%"));
    }

    #[test]
    fn test_old_sessions_not_in_workout_summary() {
        let history = vec![session(72, "Old Day", "Pull Up", vec![WorkoutSet::working(0.0, 8)])];
        let text = build_summary(&history, None, now(), 30, 5.0);
        assert!(!text.contains("Old Day"));
    }

    #[test]
    fn test_summary_includes_routine() {
        let routine = routine();
        let text = build_summary(&[], Some(&routine), now(), 30, 5.0);
        assert!(text.contains(&format_routine(&routine)));
    }

    #[test]
    fn test_format_routine_lines() {
        let routine = routine();
        let text = format_routine(&routine);

        assert!(text.starts_with("💪 Push"));
        assert!(text.contains("1. "));
        assert!(text.contains("warm-up 0kg x 10 | 30kg x 8, 30kg x 8"));
        assert!(!text.contains("Could not fill"));
    }
}
