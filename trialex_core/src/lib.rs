#![deny(
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
    clippy::missing_errors_doc
)]

use async_trait::async_trait;

pub mod entity;
pub mod trial;
pub mod util;

pub use entity::{EntityCategory, EntityMap};
pub use trial::{
    CriteriaSplit, EntityCounts, ExtractionRecord, ProcessedTrial, SegmentEntities, TrialRecord,
};

/// A registry of clinical trials that can be searched and fetched by id.
#[async_trait]
pub trait TrialSource: Send + Sync {
    /// Search the registry and return the NCT identifiers of matching trials.
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<String>>;

    /// Fetch the full record for one NCT identifier.
    async fn fetch(&self, nct_id: &str) -> anyhow::Result<TrialRecord>;
}

/// An abstractive text-to-text model used for criteria summaries.
///
/// Implementations are treated as black boxes: callers bound the input
/// length themselves and fall back to truncation on any error.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> anyhow::Result<String>;
}
