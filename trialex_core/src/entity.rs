//! Entity categories and the per-segment entity map.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// The closed set of entity types recovered from eligibility text.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EntityCategory {
    /// Cancer types and disease states: "non-small cell lung cancer"
    Disease = 0,
    /// Named drugs and treatment classes: "pembrolizumab", "checkpoint inhibitor"
    Drug = 1,
    /// Molecular markers: "egfr mutation", "pd-l1 expression"
    Biomarker = 2,
    /// Lab requirements, with thresholds when stated: "serum creatinine ≤1.5"
    LabTest = 3,
    /// Medical procedures: "tumor biopsy", "radiation therapy"
    Procedure = 4,
}

impl EntityCategory {
    /// Every category, in output order.
    pub const ALL: [Self; 5] = [
        Self::Disease,
        Self::Drug,
        Self::Biomarker,
        Self::LabTest,
        Self::Procedure,
    ];

    /// Returns the string representation used in serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disease => "DISEASE",
            Self::Drug => "DRUG",
            Self::Biomarker => "BIOMARKER",
            Self::LabTest => "LAB_TEST",
            Self::Procedure => "PROCEDURE",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "DISEASE" => Ok(Self::Disease),
            "DRUG" => Ok(Self::Drug),
            "BIOMARKER" => Ok(Self::Biomarker),
            "LAB_TEST" => Ok(Self::LabTest),
            "PROCEDURE" => Ok(Self::Procedure),
            _ => Err("unknown entity category"),
        }
    }
}

/// Normalized entities of one text, grouped by category.
///
/// Every stored list is sorted ascending and free of duplicates, and
/// categories without entities are absent. An absent category and an empty
/// one mean the same thing to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap(BTreeMap<EntityCategory, Vec<String>>);

impl EntityMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a map from per-category sets, dropping empty categories.
    #[must_use]
    pub fn from_sets(sets: BTreeMap<EntityCategory, BTreeSet<String>>) -> Self {
        Self(
            sets.into_iter()
                .filter(|(_, set)| !set.is_empty())
                .map(|(category, set)| (category, set.into_iter().collect()))
                .collect(),
        )
    }

    /// Entities of a category, or `None` when the category had no match.
    #[must_use]
    pub fn get(&self, category: EntityCategory) -> Option<&[String]> {
        self.0.get(&category).map(Vec::as_slice)
    }

    /// Entities of a category, empty when the category had no match.
    #[must_use]
    pub fn entities(&self, category: EntityCategory) -> &[String] {
        self.get(category).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, category: EntityCategory, phrase: &str) -> bool {
        self.entities(category).iter().any(|e| e == phrase)
    }

    /// Categories that hold at least one entity.
    pub fn categories(&self) -> impl Iterator<Item = EntityCategory> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &[String])> {
        self.0.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Total number of entities across all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
