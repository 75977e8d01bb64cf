//! Exercise catalog - templates, focus table and the built-in exercise set

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Exercise definition supplied by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    pub primary_muscle_group: String,
    pub equipment: String,
}

impl ExerciseTemplate {
    pub fn new(id: &str, name: &str, primary_muscle_group: &str, equipment: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            primary_muscle_group: primary_muscle_group.to_string(),
            equipment: equipment.to_string(),
        }
    }

    /// Case-insensitive substring match against the primary muscle group
    pub fn targets(&self, muscle_group: &str) -> bool {
        normalize(&self.primary_muscle_group).contains(&normalize(muscle_group))
    }

    pub fn is_bodyweight(&self) -> bool {
        matches!(normalize(&self.equipment).as_str(), "" | "none" | "bodyweight")
    }
}

/// Training focus of a day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Focus {
    Push,
    Pull,
    Legs,
    Core,
}

impl Focus {
    /// Focus used when there is nothing to base a decision on
    pub const COLD_START: Focus = Focus::Push;

    pub fn name(&self) -> &'static str {
        match self {
            Focus::Push => "Push",
            Focus::Pull => "Pull",
            Focus::Legs => "Legs",
            Focus::Core => "Core",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Focus::Push => "💪",
            Focus::Pull => "🏋️",
            Focus::Legs => "🦵",
            Focus::Core => "🎯",
        }
    }

    pub fn all() -> &'static [Focus] {
        &[Focus::Push, Focus::Pull, Focus::Legs, Focus::Core]
    }

    /// Muscle groups trained by this focus, in table order
    pub fn target_groups(&self) -> &'static [&'static str] {
        match self {
            Focus::Push => &["chest", "shoulders", "triceps"],
            Focus::Pull => &["lats", "upper_back", "biceps"],
            Focus::Legs => &["quadriceps", "hamstrings", "glutes", "calves"],
            Focus::Core => &["abdominals", "obliques"],
        }
    }

    /// Parse a stored focus name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Focus> {
        Focus::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Look up the focus that trains a muscle group
    pub fn for_muscle_group(group: &str) -> Option<Focus> {
        let group = normalize(group);
        MUSCLE_FOCUS
            .iter()
            .find(|(muscle, _)| *muscle == group)
            .map(|(_, focus)| *focus)
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed muscle → focus lookup
const MUSCLE_FOCUS: &[(&str, Focus)] = &[
    ("chest", Focus::Push),
    ("shoulders", Focus::Push),
    ("triceps", Focus::Push),
    ("lats", Focus::Pull),
    ("upper_back", Focus::Pull),
    ("biceps", Focus::Pull),
    ("traps", Focus::Pull),
    ("forearms", Focus::Pull),
    ("quadriceps", Focus::Legs),
    ("hamstrings", Focus::Legs),
    ("glutes", Focus::Legs),
    ("calves", Focus::Legs),
    ("abductors", Focus::Legs),
    ("adductors", Focus::Legs),
    ("abdominals", Focus::Core),
    ("obliques", Focus::Core),
];

pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Ab/core-only groups, kept out of the least-trained comparison
pub fn is_core_group(group: &str) -> bool {
    let group = normalize(group);
    ["abdominal", "oblique", "core", "abs"]
        .iter()
        .any(|k| group.contains(k))
}

pub fn is_cardio_group(group: &str) -> bool {
    normalize(group).contains("cardio")
}

/// Spinal-loading lifts removed before selection unless configured otherwise
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "Deadlift (Barbell)",
    "Romanian Deadlift (Barbell)",
    "Good Morning (Barbell)",
    "Squat (Barbell)",
    "Back Extension",
];

/// Built-in catalog: (id, name, primary muscle group, equipment)
const BUILTIN: &[(&str, &str, &str, &str)] = &[
    // Push
    ("bench_press_bb", "Bench Press (Barbell)", "chest", "barbell"),
    ("incline_press_db", "Incline Bench Press (Dumbbell)", "chest", "dumbbell"),
    ("chest_fly_machine", "Chest Fly (Machine)", "chest", "machine"),
    ("push_up", "Push Up", "chest", "none"),
    ("overhead_press_db", "Overhead Press (Dumbbell)", "shoulders", "dumbbell"),
    ("lateral_raise_cable", "Lateral Raise (Cable)", "shoulders", "cable"),
    ("triceps_pushdown", "Triceps Pushdown (Cable)", "triceps", "cable"),
    ("skullcrusher_bb", "Skullcrusher (Barbell)", "triceps", "barbell"),
    // Pull
    ("lat_pulldown", "Lat Pulldown (Cable)", "lats", "cable"),
    ("pull_up", "Pull Up", "lats", "none"),
    ("seated_row_machine", "Seated Row (Machine)", "upper_back", "machine"),
    ("face_pull", "Face Pull (Cable)", "upper_back", "cable"),
    ("bicep_curl_db", "Bicep Curl (Dumbbell)", "biceps", "dumbbell"),
    ("hammer_curl_db", "Hammer Curl (Dumbbell)", "biceps", "dumbbell"),
    // Legs
    ("leg_press", "Leg Press (Machine)", "quadriceps", "machine"),
    ("goblet_squat", "Goblet Squat (Kettlebell)", "quadriceps", "kettlebell"),
    ("squat_bb", "Squat (Barbell)", "quadriceps", "barbell"),
    ("leg_curl", "Lying Leg Curl (Machine)", "hamstrings", "machine"),
    ("deadlift_bb", "Deadlift (Barbell)", "hamstrings", "barbell"),
    ("rdl_bb", "Romanian Deadlift (Barbell)", "hamstrings", "barbell"),
    ("good_morning_bb", "Good Morning (Barbell)", "hamstrings", "barbell"),
    ("hip_thrust_bb", "Hip Thrust (Barbell)", "glutes", "barbell"),
    ("walking_lunge_db", "Walking Lunge (Dumbbell)", "glutes", "dumbbell"),
    ("calf_raise", "Standing Calf Raise (Machine)", "calves", "machine"),
    // Core
    ("cable_crunch", "Cable Crunch", "abdominals", "cable"),
    ("plank", "Plank", "abdominals", "none"),
    ("hanging_leg_raise", "Hanging Leg Raise", "abdominals", "none"),
    ("ab_wheel", "Ab Wheel", "abdominals", "other"),
    ("russian_twist", "Russian Twist", "obliques", "none"),
    ("side_plank", "Side Plank", "obliques", "none"),
    ("back_extension", "Back Extension", "lower_back", "none"),
];

pub fn builtin_catalog() -> Vec<ExerciseTemplate> {
    BUILTIN
        .iter()
        .map(|(id, name, group, equipment)| ExerciseTemplate::new(id, name, group, equipment))
        .collect()
}

/// Find template by exact name (for matching performed exercises)
pub fn find_template_by_name<'a>(
    catalog: &'a [ExerciseTemplate],
    name: &str,
) -> Option<&'a ExerciseTemplate> {
    catalog.iter().find(|t| t.name == name)
}

/// Reject empty catalogs and entries without id/name or with duplicate ids
pub fn validate_catalog(catalog: &[ExerciseTemplate]) -> Result<(), PlanError> {
    if catalog.is_empty() {
        return Err(PlanError::EmptyCatalog);
    }

    let mut ids = HashSet::new();
    for template in catalog {
        if template.id.trim().is_empty() {
            return Err(PlanError::MalformedCatalog(format!(
                "template '{}' has no id",
                template.name
            )));
        }
        if template.name.trim().is_empty() {
            return Err(PlanError::MalformedCatalog(format!(
                "template {} has no name",
                template.id
            )));
        }
        if !ids.insert(template.id.as_str()) {
            return Err(PlanError::MalformedCatalog(format!(
                "duplicate template id {}",
                template.id
            )));
        }
    }
    Ok(())
}

/// Remove denylisted names (case-insensitive)
pub fn apply_exclusions(catalog: &[ExerciseTemplate], excluded: &[String]) -> Vec<ExerciseTemplate> {
    let excluded: HashSet<String> = excluded.iter().map(|n| normalize(n)).collect();
    catalog
        .iter()
        .filter(|t| !excluded.contains(&normalize(&t.name)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert!(validate_catalog(&builtin_catalog()).is_ok());
    }

    #[test]
    fn test_builtin_covers_every_focus() {
        let catalog = builtin_catalog();
        for focus in Focus::all() {
            for group in focus.target_groups() {
                assert!(
                    catalog.iter().any(|t| t.targets(group)),
                    "No exercise for {} ({})",
                    group,
                    focus
                );
            }
        }
    }

    #[test]
    fn test_targets_case_insensitive_substring() {
        let t = ExerciseTemplate::new("x", "Row", "Upper_Back", "cable");
        assert!(t.targets("upper_back"));
        assert!(t.targets("BACK"));
        assert!(!t.targets("lats"));
    }

    #[test]
    fn test_focus_from_name() {
        assert_eq!(Focus::from_name("pull"), Some(Focus::Pull));
        assert_eq!(Focus::from_name(" Legs "), Some(Focus::Legs));
        assert_eq!(Focus::from_name("Arms"), None);
    }

    #[test]
    fn test_focus_for_muscle_group() {
        assert_eq!(Focus::for_muscle_group("Chest"), Some(Focus::Push));
        assert_eq!(Focus::for_muscle_group("hamstrings"), Some(Focus::Legs));
        assert_eq!(Focus::for_muscle_group("abdominals"), Some(Focus::Core));
        assert_eq!(Focus::for_muscle_group("cardio"), None);
        assert_eq!(Focus::for_muscle_group("lower_back"), None);
    }

    #[test]
    fn test_core_and_cardio_groups() {
        assert!(is_core_group("abdominals"));
        assert!(is_core_group("Obliques"));
        assert!(!is_core_group("chest"));
        assert!(is_cardio_group("Cardio"));
    }

    #[test]
    fn test_validate_empty_catalog() {
        assert_eq!(validate_catalog(&[]), Err(PlanError::EmptyCatalog));
    }

    #[test]
    fn test_validate_duplicate_id() {
        let catalog = vec![
            ExerciseTemplate::new("a", "One", "chest", "none"),
            ExerciseTemplate::new("a", "Two", "chest", "none"),
        ];
        assert!(matches!(validate_catalog(&catalog), Err(PlanError::MalformedCatalog(_))));
    }

    #[test]
    fn test_validate_missing_name() {
        let catalog = vec![ExerciseTemplate::new("a", "  ", "chest", "none")];
        assert!(matches!(validate_catalog(&catalog), Err(PlanError::MalformedCatalog(_))));
    }

    #[test]
    fn test_apply_exclusions() {
        let excluded: Vec<String> = DEFAULT_EXCLUDED.iter().map(|s| s.to_uppercase()).collect();
        let filtered = apply_exclusions(&builtin_catalog(), &excluded);
        assert!(filtered.iter().all(|t| t.name != "Deadlift (Barbell)"));
        assert_eq!(filtered.len(), builtin_catalog().len() - DEFAULT_EXCLUDED.len());
    }

    #[test]
    fn test_is_bodyweight() {
        assert!(ExerciseTemplate::new("p", "Plank", "abdominals", "none").is_bodyweight());
        assert!(!ExerciseTemplate::new("c", "Crunch", "abdominals", "cable").is_bodyweight());
    }
}
