//! Split rotation - decides which focus gets trained next

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::RotationState;
use super::history::HistoryAnalysis;
use crate::catalog::{Focus, is_cardio_group, is_core_group};
use crate::error::PlanWarning;

/// Why a focus was chosen
#[derive(Debug, Clone, PartialEq)]
pub enum SplitReason {
    /// Previous prescription not completed yet
    Retry,
    /// Mapped from the least-trained muscle group
    LeastTrained { muscle_group: String, count: u32 },
    ColdStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitDecision {
    pub focus: Focus,
    pub reason: SplitReason,
    /// State to persist, written whether or not the routine gets used
    pub rotation: RotationState,
    pub warning: Option<PlanWarning>,
}

/// Pick today's focus.
///
/// Priority: retry an uncompleted prescription, then the focus of the
/// least-trained muscle group, then the cold-start default.
pub fn select_focus(
    rotation: Option<&RotationState>,
    analysis: &HistoryAnalysis,
    today: NaiveDate,
) -> SplitDecision {
    let mut warning = None;

    let (focus, reason) = match rotation {
        Some(state) => match Focus::from_name(&state.last_focus) {
            Some(last) if !completed_since(state, analysis) => (last, SplitReason::Retry),
            Some(_) => least_trained_focus(analysis),
            None => {
                let stale = PlanWarning::StaleRotation { last_focus: state.last_focus.clone() };
                warn!("{}", stale);
                warning = Some(stale);
                (Focus::COLD_START, SplitReason::ColdStart)
            }
        },
        None => least_trained_focus(analysis),
    };

    info!("Focus for {}: {} ({:?})", today, focus, reason);

    SplitDecision {
        focus,
        reason,
        rotation: RotationState {
            last_focus: focus.name().to_string(),
            last_scheduled_date: today,
        },
        warning,
    }
}

/// A session on or after the scheduled date counts as completion
fn completed_since(state: &RotationState, analysis: &HistoryAnalysis) -> bool {
    analysis
        .last_session_date
        .is_some_and(|d| d.date_naive() >= state.last_scheduled_date)
}

fn least_trained_focus(analysis: &HistoryAnalysis) -> (Focus, SplitReason) {
    let mapped: Vec<(&str, u32, Focus)> = analysis
        .muscle_group_frequency
        .iter()
        .filter(|(group, _)| !is_cardio_group(group))
        .filter_map(|(group, count)| Focus::for_muscle_group(group).map(|f| (group.as_str(), *count, f)))
        .collect();

    if mapped.is_empty() {
        return (Focus::COLD_START, SplitReason::ColdStart);
    }

    // Core groups only count when nothing else was trained
    if mapped.iter().all(|(group, _, _)| is_core_group(group)) {
        return least_of(mapped);
    }

    // Untrained focus groups count as zero
    let mut counts: BTreeMap<&str, (u32, Focus)> = Focus::all()
        .iter()
        .flat_map(|focus| focus.target_groups().iter().map(move |group| (*group, (0, *focus))))
        .filter(|(group, _)| !is_core_group(group))
        .collect();
    for (group, count, focus) in mapped.into_iter().filter(|(group, _, _)| !is_core_group(group)) {
        counts.insert(group, (count, focus));
    }

    least_of(counts.into_iter().map(|(group, (count, focus))| (group, count, focus)).collect())
}

/// Lowest count wins, ties go to the alphabetically first group
fn least_of(mut groups: Vec<(&str, u32, Focus)>) -> (Focus, SplitReason) {
    groups.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    match groups.first() {
        Some((group, count, focus)) => (
            *focus,
            SplitReason::LeastTrained { muscle_group: group.to_string(), count: *count },
        ),
        None => (Focus::COLD_START, SplitReason::ColdStart),
    }
}
