//! Entity matcher over the compiled pattern table.
//!
//! Every pattern is applied to the full text independently, so matches of
//! different patterns may overlap. "non-small cell lung cancer" is reported
//! together with "small cell lung cancer" and "lung cancer".

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trialex_core::util::char_count;
use trialex_core::{EntityCategory, EntityMap};

use crate::matcher::patterns::{BuildError, CompiledPattern, PatternDef, default_patterns};

/// Texts shorter than this (in characters) carry no extractable entity.
pub const MIN_TEXT_CHARS: usize = 20;

/// Phrases that only a future pattern could produce by accident. They name
/// no concrete drug and are dropped from the DRUG category.
const DRUG_DENYLIST: [&str; 2] = ["therapy", "treatment"];

static DEFAULT_MATCHER: Lazy<EntityMatcher> = Lazy::new(|| {
    EntityMatcher::with_defaults()
        .unwrap_or_else(|e| panic!("built-in pattern table failed to compile: {e}"))
});

/// Configuration for the entity matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Patterns applied after the built-in table.
    #[serde(default)]
    pub extra_patterns: Vec<PatternDef>,
}

impl ExtractionConfig {
    /// Built-in table followed by the extra patterns.
    #[must_use]
    pub fn pattern_defs(&self) -> Vec<PatternDef> {
        let mut defs = default_patterns();
        defs.extend(self.extra_patterns.iter().cloned());
        defs
    }
}

/// Compiled, immutable pattern table. Safe to share between threads.
#[derive(Debug, Clone)]
pub struct EntityMatcher {
    patterns: Vec<CompiledPattern>,
}

impl EntityMatcher {
    /// Build a matcher from configuration.
    ///
    /// # Errors
    /// Returns an error if any pattern fails to compile or two patterns share
    /// an id.
    pub fn new(config: &ExtractionConfig) -> Result<Self, BuildError> {
        Self::from_defs(&config.pattern_defs())
    }

    /// Build a matcher from the built-in table only.
    ///
    /// # Errors
    /// Returns an error if a built-in pattern fails to compile.
    pub fn with_defaults() -> Result<Self, BuildError> {
        Self::from_defs(&default_patterns())
    }

    /// Build a matcher from an explicit list of definitions.
    ///
    /// # Errors
    /// Returns an error if any pattern fails to compile or two patterns share
    /// an id.
    pub fn from_defs(defs: &[PatternDef]) -> Result<Self, BuildError> {
        let mut seen = BTreeSet::new();
        let mut patterns = Vec::with_capacity(defs.len());

        for def in defs {
            if !seen.insert(def.id.as_str()) {
                return Err(BuildError::DuplicateId(def.id.clone()));
            }
            patterns.push(def.build()?);
        }

        Ok(Self { patterns })
    }

    /// The process-wide matcher over the built-in table.
    pub fn global() -> &'static Self {
        &DEFAULT_MATCHER
    }

    /// Number of compiled patterns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of patterns per category.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<EntityCategory, usize> {
        let mut counts = BTreeMap::new();
        for pattern in &self.patterns {
            *counts.entry(pattern.category).or_insert(0) += 1;
        }
        counts
    }

    /// Extract categorized entities from a piece of text.
    ///
    /// Phrases are lowercased and trimmed, then deduplicated and sorted per
    /// category. Categories without a match are omitted. Text under
    /// [`MIN_TEXT_CHARS`] characters yields an empty map.
    #[must_use]
    pub fn extract(&self, text: &str) -> EntityMap {
        if char_count(text) < MIN_TEXT_CHARS {
            return EntityMap::new();
        }

        let mut found: BTreeMap<EntityCategory, BTreeSet<String>> = BTreeMap::new();

        for pattern in &self.patterns {
            let mut hits = 0usize;
            for phrase in pattern.phrases(text) {
                if pattern.category == EntityCategory::Drug
                    && DRUG_DENYLIST.contains(&phrase.as_str())
                {
                    continue;
                }
                found.entry(pattern.category).or_default().insert(phrase);
                hits += 1;
            }
            if hits > 0 {
                debug!("Pattern {} matched {hits} time(s)", pattern.id);
            }
        }

        EntityMap::from_sets(found)
    }
}

/// Extract entities with the built-in pattern table.
#[must_use]
pub fn extract_entities(text: &str) -> EntityMap {
    EntityMatcher::global().extract(text)
}
