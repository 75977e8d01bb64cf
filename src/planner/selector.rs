//! Exercise selection - neglected groups first, recency avoidance, equipment variety

use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{ExerciseTemplate, normalize};

/// How an exercise made it into the routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Matched a target group, not done recently
    Targeted,
    /// Matched a target group, recency filter dropped
    RecencyRelaxed,
    /// Extra pick from a random focus group to reach the count
    Filler,
    /// Any unused catalog entry
    Fallback,
}

impl SelectionReason {
    pub fn note(&self) -> &'static str {
        match self {
            SelectionReason::Targeted => "targets an undertrained group",
            SelectionReason::RecencyRelaxed => "repeated from the last day, no alternative left",
            SelectionReason::Filler => "extra work for the focus",
            SelectionReason::Fallback => "fallback selection",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub template: ExerciseTemplate,
    /// Group that justified the pick
    pub muscle_group: String,
    pub equipment: String,
    pub reason: SelectionReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSelection {
    pub picks: Vec<Selection>,
    pub requested: usize,
}

impl BlockSelection {
    pub fn short_by(&self) -> usize {
        self.requested.saturating_sub(self.picks.len())
    }
}

/// Picks exercises for one planning run.
///
/// Holds the run's selection state so consecutive blocks never repeat an
/// exercise and keep preferring unused equipment.
pub struct ExerciseSelector<'a> {
    catalog: &'a [ExerciseTemplate],
    recent: HashSet<String>,
    selected: HashSet<String>,
    used_equipment: HashSet<String>,
}

impl<'a> ExerciseSelector<'a> {
    /// `catalog` must already have the denylist removed
    pub fn new(catalog: &'a [ExerciseTemplate], recent_titles: &BTreeSet<String>) -> Self {
        Self {
            catalog,
            recent: recent_titles.iter().map(|t| normalize(t)).collect(),
            selected: HashSet::new(),
            used_equipment: HashSet::new(),
        }
    }

    /// Select up to `count` exercises for `targets` (most neglected first)
    pub fn select_block<R: Rng>(&mut self, label: &str, targets: &[String], count: usize, rng: &mut R) -> BlockSelection {
        let mut picks = Vec::with_capacity(count);

        for group in targets {
            if picks.len() >= count {
                break;
            }
            if let Some(selection) = self.pick_for_group(group, false, rng) {
                picks.push(selection);
            }
        }

        let mut eligible: Vec<&String> = targets.iter().collect();
        while picks.len() < count && !eligible.is_empty() {
            let idx = rng.gen_range(0..eligible.len());
            match self.pick_for_group(eligible[idx], true, rng) {
                Some(selection) => picks.push(selection),
                None => {
                    eligible.remove(idx);
                }
            }
        }

        while picks.len() < count {
            match self.pick_fallback(rng) {
                Some(selection) => picks.push(selection),
                None => break,
            }
        }

        let block = BlockSelection { picks, requested: count };
        if block.short_by() > 0 {
            warn!("{} block short by {} exercises, catalog exhausted", label, block.short_by());
        }
        block
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(&normalize(name))
    }

    fn candidates(&self, group: &str, respect_recency: bool) -> Vec<&'a ExerciseTemplate> {
        self.catalog
            .iter()
            .filter(|t| t.targets(group))
            .filter(|t| !self.is_selected(&t.name))
            .filter(|t| !respect_recency || !self.recent.contains(&normalize(&t.name)))
            .collect()
    }

    fn pick_for_group<R: Rng>(&mut self, group: &str, filler: bool, rng: &mut R) -> Option<Selection> {
        let (candidates, relaxed) = match self.candidates(group, true) {
            c if !c.is_empty() => (c, false),
            _ => (self.candidates(group, false), true),
        };
        let template = self.choose_varied(&candidates, rng)?;

        let reason = match (filler, relaxed) {
            (true, _) => SelectionReason::Filler,
            (false, true) => SelectionReason::RecencyRelaxed,
            (false, false) => SelectionReason::Targeted,
        };
        debug!("Picked {} for {} ({:?})", template.name, group, reason);
        Some(self.record(template, group, reason))
    }

    fn pick_fallback<R: Rng>(&mut self, rng: &mut R) -> Option<Selection> {
        let unused: Vec<&'a ExerciseTemplate> = self
            .catalog
            .iter()
            .filter(|t| !self.is_selected(&t.name))
            .collect();
        let template = *unused.choose(rng)?;
        debug!("Fallback pick {}", template.name);
        Some(self.record(template, &template.primary_muscle_group, SelectionReason::Fallback))
    }

    /// Random pick among candidates whose equipment is new to this run,
    /// or among all candidates when none is
    fn choose_varied<R: Rng>(&self, candidates: &[&'a ExerciseTemplate], rng: &mut R) -> Option<&'a ExerciseTemplate> {
        let novel: Vec<&'a ExerciseTemplate> = candidates
            .iter()
            .copied()
            .filter(|t| !self.used_equipment.contains(&normalize(&t.equipment)))
            .collect();
        let pool = if novel.is_empty() { candidates } else { novel.as_slice() };
        pool.choose(rng).copied()
    }

    fn record(&mut self, template: &ExerciseTemplate, group: &str, reason: SelectionReason) -> Selection {
        self.selected.insert(normalize(&template.name));
        self.used_equipment.insert(normalize(&template.equipment));
        Selection {
            template: template.clone(),
            muscle_group: normalize(group),
            equipment: template.equipment.clone(),
            reason,
        }
    }
}
