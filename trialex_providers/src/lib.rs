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

//! Network collaborators: the ClinicalTrials.gov registry client and a
//! chat-completion summarizer, plus the collection loop that drives the
//! registry.

pub mod clinical_trials;
pub mod collect;
pub mod retry;
pub mod summarizer;

pub use clinical_trials::ClinicalTrialsClient;
pub use collect::collect_trials;
pub use retry::retry_with_backoff;
pub use summarizer::ChatSummarizer;
