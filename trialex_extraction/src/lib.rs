#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]

//! Criteria segmentation and entity extraction for clinical-trial
//! eligibility text.
//!
//! The three core operations are pure functions over `&str`:
//! [`split_criteria`], [`tokenize_items`] and [`extract_entities`]. The
//! remaining modules orchestrate them over whole trial records.

use regex::Regex;

pub mod matcher;
pub mod pipeline;
pub mod splitter;
pub mod stats;
pub mod summary;
pub mod thresholds;
pub mod tokenizer;

pub use matcher::engine::{EntityMatcher, ExtractionConfig, extract_entities};
pub use matcher::patterns::{BuildError, PatternDef, default_patterns};
pub use pipeline::{build_records, extract_all, extract_segments, preprocess_all, preprocess_trial};
pub use splitter::{clean_artifacts, split_criteria};
pub use stats::{BiomarkerClass, ExtractionStats, TreatmentClass};
pub use summary::{SummarySettings, summarize_criteria};
pub use thresholds::{LabMeasure, find_threshold, scan_thresholds};
pub use tokenizer::tokenize_items;

/// Compile a regex that is part of the source code.
///
/// Built-in expressions are covered by unit tests, so a failure here is a
/// programming error rather than an input problem.
pub(crate) fn builtin_regex(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|e| panic!("built-in regex {pattern:?} failed to compile: {e}"))
}
