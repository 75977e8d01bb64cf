//! autocoach - Personal strength training autoplanner

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use autocoach::catalog::ExerciseTemplate;
use autocoach::coach::{daily_summary, load_catalog, make_rng, plan_from_store};
use autocoach::config::PlannerConfig;
use autocoach::db::{Database, PerformedExercise, Session, WorkoutSet};
use autocoach::summary::format_routine;
use autocoach::tui::App;

#[derive(Parser)]
#[command(name = "autocoach")]
#[command(author, version, about = "Personal strength training autoplanner")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "AUTOCOACH_DB", default_value = "autocoach.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Planner tuning, each with an AUTOCOACH_* fallback
#[derive(Args, Clone)]
struct TuningArgs {
    /// Days of history to analyze
    #[arg(long, env = "AUTOCOACH_LOOKBACK_DAYS", default_value = "30",
          value_parser = clap::value_parser!(i64).range(1..=3650))]
    lookback_days: i64,

    /// Exercises in the main block
    #[arg(long, env = "AUTOCOACH_SETS_PER_FOCUS", default_value = "4")]
    sets_per_focus: usize,

    /// Exercises in the abs/core block
    #[arg(long, env = "AUTOCOACH_CORE_BLOCK", default_value = "3")]
    core_block: usize,

    /// Skip exercises performed within this many hours
    #[arg(long, env = "AUTOCOACH_RECENCY_HOURS", default_value = "24",
          value_parser = clap::value_parser!(i64).range(0..=24 * 365))]
    recency_hours: i64,

    /// Weight added when overload triggers (kg)
    #[arg(long, env = "AUTOCOACH_OVERLOAD_KG", default_value = "2.5")]
    overload_kg: f64,

    /// Comma-separated exercise names never to plan (replaces the default denylist)
    #[arg(long, env = "AUTOCOACH_EXCLUDED")]
    excluded: Option<String>,

    /// Title the routine is published under
    #[arg(long, env = "AUTOCOACH_ROUTINE_TITLE")]
    routine_title: Option<String>,
}

impl TuningArgs {
    fn into_config(self) -> PlannerConfig {
        let mut config = PlannerConfig {
            lookback_days: self.lookback_days,
            sets_per_focus: self.sets_per_focus,
            core_block_size: self.core_block,
            recency_hours: self.recency_hours,
            overload_increment_kg: self.overload_kg,
            ..PlannerConfig::default()
        };
        if let Some(title) = self.routine_title {
            config.routine_title = title;
        }
        match self.excluded {
            Some(list) => config.with_excluded(&list),
            None => config,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Plan today's routine and publish it
    Plan {
        /// Seed for reproducible selection
        #[arg(long, env = "AUTOCOACH_SEED")]
        seed: Option<u64>,

        /// Print the routine without saving rotation or publishing
        #[arg(long)]
        dry_run: bool,

        /// Print the routine as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Import workout sessions from a JSON file
    ImportHistory {
        path: PathBuf,
    },

    /// Replace the exercise catalog from a JSON file
    ImportCatalog {
        path: PathBuf,
    },

    /// Log a workout for one exercise
    Log {
        /// Exercise name (e.g., "Bench Press (Barbell)")
        exercise: String,

        /// Weight per set (kg)
        #[arg(short, long)]
        weight: f64,

        /// Reps per set
        #[arg(short, long, default_value = "8")]
        reps: u32,

        /// Number of sets
        #[arg(short, long, default_value = "3")]
        sets: usize,

        /// Session title
        #[arg(short, long, default_value = "Logged Workout")]
        title: String,
    },

    /// List workout history
    History {
        /// Number of sessions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the daily summary
    Summary {
        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// List the exercise catalog in use
    Catalog,

    /// Open TUI dashboard
    Tui,

    /// Start Telegram bot
    Bot {
        /// Telegram bot token (or set TELOXIDE_TOKEN env var)
        #[arg(short, long, env = "TELOXIDE_TOKEN")]
        token: String,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Plan { seed, dry_run, json, tuning }) => {
            let config = tuning.into_config();
            let plan = plan_from_store(&db, &config, Utc::now(), &mut make_rng(seed), dry_run)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan.routine)?);
            } else {
                println!("{}", format_routine(&plan.routine));
                for warning in &plan.warnings {
                    println!("warning: {}", warning);
                }
            }
        }

        Some(Commands::ImportHistory { path }) => {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let sessions: Vec<Session> = serde_json::from_str(&raw)?;
            for session in &sessions {
                db.add_session(session)?;
            }
            println!("Imported {} sessions", sessions.len());
        }

        Some(Commands::ImportCatalog { path }) => {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let templates: Vec<ExerciseTemplate> = serde_json::from_str(&raw)?;
            let count = db.replace_catalog(&templates)?;
            println!("Imported {} exercise templates", count);
        }

        Some(Commands::Log { exercise, weight, reps, sets, title }) => {
            let now = Utc::now();
            let session = Session {
                id: format!("log-{}", now.timestamp_millis()),
                date: now,
                title,
                exercises: vec![PerformedExercise {
                    exercise_name: exercise.clone(),
                    sets: vec![WorkoutSet::working(weight, reps); sets],
                }],
            };
            db.add_session(&session)?;
            println!("Logged: {} - {}x{} @ {}kg (id: {})", exercise, sets, reps, weight, session.id);
        }

        Some(Commands::History { limit }) => {
            let sessions = db.get_sessions()?;
            println!("Recent sessions:");
            println!("{:-<60}", "");
            for s in sessions.iter().rev().take(limit) {
                println!("{} | {}", s.date.format("%Y-%m-%d %H:%M"), s.title);
                for ex in &s.exercises {
                    let sets: Vec<String> = ex
                        .sets
                        .iter()
                        .map(|set| match (set.weight_kg, set.reps) {
                            (Some(w), Some(r)) => format!("{}kg x {}", w, r),
                            (None, Some(r)) => format!("{} reps", r),
                            _ => "-".to_string(),
                        })
                        .collect();
                    println!("    {:30} {}", ex.exercise_name, sets.join(", "));
                }
            }
        }

        Some(Commands::Summary { tuning }) => {
            let config = tuning.into_config();
            println!("{}", daily_summary(&db, &config, Utc::now())?);
        }

        Some(Commands::Catalog) => {
            for t in load_catalog(&db)? {
                println!("{:30} | {:12} | {}", t.name, t.primary_muscle_group, t.equipment);
            }
        }

        Some(Commands::Bot { token, tuning }) => {
            println!("Starting Telegram bot...");
            println!("Database: {}", cli.db);
            drop(db);
            autocoach::bot::run_bot(token, &cli.db, tuning.into_config()).await?;
        }

        Some(Commands::Tui) | None => {
            let mut app = App::new(db)?;
            app.run()?;
        }
    }

    Ok(())
}
