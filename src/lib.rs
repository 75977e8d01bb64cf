//! autocoach - Personal strength training autoplanner
//!
//! Push / Pull / Legs / Core rotation with progressive overload

pub mod bot;
pub mod catalog;
pub mod coach;
pub mod config;
pub mod db;
pub mod error;
pub mod planner;
pub mod quotes;
pub mod summary;
pub mod tui;

pub use config::PlannerConfig;
pub use db::Database;
pub use planner::{DayPlan, PlannedRoutine, plan_day};
