//! Pattern-based entity matching.
//!
//! The pattern table is plain data ([`patterns::PatternDef`]) compiled once
//! into an [`engine::EntityMatcher`]. Callers that need more vocabulary
//! append their own definitions through [`engine::ExtractionConfig`].

pub mod engine;
pub mod patterns;
