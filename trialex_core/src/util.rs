//! Character-aware text helpers shared by the pipeline crates.

/// Number of Unicode scalar values in `text`.
///
/// Length floors throughout the pipeline count characters, not bytes, so
/// that glyphs such as `≥` or `μ` count once.
#[must_use]
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate to `max_chars` characters and mark the cut with `...`.
///
/// Text that already fits is returned unchanged.
#[must_use]
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() == text.len() {
        text.to_string()
    } else {
        format!("{head}...")
    }
}
