//! Section splitting of raw eligibility text.
//!
//! Raw criteria come as one block with an optional "Inclusion Criteria"
//! header and an "Exclusion Criteria" header somewhere in the middle. The
//! exclusion header is the only boundary signal that is recognised.

use once_cell::sync::Lazy;
use regex::Regex;
use trialex_core::CriteriaSplit;
use trialex_core::util::char_count;

use crate::builtin_regex;

/// Inputs shorter than this (in characters) cannot hold two sections.
pub const MIN_CRITERIA_CHARS: usize = 10;

static BULLETS: Lazy<Regex> = Lazy::new(|| builtin_regex(r"[■●○▪▫•]"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| builtin_regex(r"\s+"));
static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| builtin_regex(r"(?i)\bpage \d+"));
static EXCLUSION_HEADER: Lazy<Regex> =
    Lazy::new(|| builtin_regex(r"(?i)exclusion\s+criteria[:\s]*"));
static INCLUSION_HEADER: Lazy<Regex> =
    Lazy::new(|| builtin_regex(r"(?i)^inclusion\s+criteria[:\s]*"));

/// Remove export artifacts: bullet glyphs, whitespace runs (newlines
/// included) and "Page N" markers.
#[must_use]
pub fn clean_artifacts(text: &str) -> String {
    let text = BULLETS.replace_all(text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = PAGE_MARKER.replace_all(&text, "");
    text.trim().to_string()
}

/// Split eligibility text into its inclusion and exclusion sections.
///
/// The text is cleaned first, then cut at the first "Exclusion Criteria"
/// header, which is consumed. A leading "Inclusion Criteria" header is
/// dropped from the inclusion side. Without an exclusion header the whole
/// cleaned text is inclusion. Too-short input yields two empty sections.
#[must_use]
pub fn split_criteria(text: &str) -> CriteriaSplit {
    if char_count(text) < MIN_CRITERIA_CHARS {
        return CriteriaSplit::default();
    }

    let cleaned = clean_artifacts(text);

    let (inclusion, exclusion) = match EXCLUSION_HEADER.find(&cleaned) {
        Some(header) => (&cleaned[..header.start()], &cleaned[header.end()..]),
        None => (cleaned.as_str(), ""),
    };

    CriteriaSplit::new(
        strip_inclusion_header(inclusion).trim(),
        exclusion.trim(),
    )
}

fn strip_inclusion_header(text: &str) -> &str {
    let text = text.trim_start();
    INCLUSION_HEADER
        .find(text)
        .map_or(text, |header| &text[header.end()..])
}
