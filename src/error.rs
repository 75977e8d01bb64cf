//! Error and warning types for planning runs

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::StoreError;

/// Fatal planning errors. Returned to the caller, never retried inside a run.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("exercise catalog is empty")]
    EmptyCatalog,

    #[error("malformed exercise catalog: {0}")]
    MalformedCatalog(String),
}

/// Errors from a planning run against the local store
#[derive(Debug, Error)]
pub enum CoachError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Non-fatal conditions recorded while planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Fewer exercises than requested could be selected
    InsufficientData {
        block: String,
        requested: usize,
        selected: usize,
    },
    /// Stored rotation references a focus the focus table doesn't know
    StaleRotation { last_focus: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::InsufficientData { block, requested, selected } => write!(
                f,
                "{} block: selected {} of {} requested exercises",
                block, selected, requested
            ),
            PlanWarning::StaleRotation { last_focus } => write!(
                f,
                "unknown focus '{}' in rotation state, using default",
                last_focus
            ),
        }
    }
}
