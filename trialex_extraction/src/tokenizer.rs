//! Itemizing a criteria section into individual statements.

use once_cell::sync::Lazy;
use regex::Regex;
use trialex_core::util::char_count;

use crate::builtin_regex;

/// Fragments shorter than this are page numbers, stray bullets or
/// punctuation rather than criteria.
pub const MIN_ITEM_CHARS: usize = 20;

/// Everything that may delimit items. Numbered markers and dash bullets
/// are confirmed against their neighbours in [`is_delimiter`].
static DELIMITER_CANDIDATES: Lazy<Regex> = Lazy::new(|| builtin_regex(r"\n|\d+\.|-|[■●○▪▫•]"));

/// Break a criteria section into its individual statements.
///
/// Items are separated by newlines, numbered markers such as `12. `, dash
/// bullets with whitespace on both sides, and bullet glyphs. The markers are
/// dropped, each fragment is trimmed, and fragments under
/// [`MIN_ITEM_CHARS`] are discarded. Order and casing are preserved and
/// repeated items are kept.
#[must_use]
pub fn tokenize_items(segment: &str) -> Vec<String> {
    let mut items = Vec::new();
    if segment.is_empty() {
        return items;
    }

    let mut start = 0;
    for candidate in DELIMITER_CANDIDATES.find_iter(segment) {
        if !is_delimiter(segment, candidate.start(), candidate.end()) {
            continue;
        }
        push_item(&mut items, &segment[start..candidate.start()]);
        start = candidate.end();
    }
    push_item(&mut items, &segment[start..]);

    items
}

/// A numbered marker must be followed by whitespace. A hyphen needs
/// whitespace on both sides, otherwise it belongs to a compound word or
/// opens the segment.
fn is_delimiter(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let next = text[end..].chars().next();

    if matched == "-" {
        let prev = text[..start].chars().next_back();
        prev.is_some_and(char::is_whitespace) && next.is_some_and(char::is_whitespace)
    } else if matched.ends_with('.') {
        next.is_some_and(char::is_whitespace)
    } else {
        true
    }
}

fn push_item(items: &mut Vec<String>, fragment: &str) {
    let item = fragment.trim();
    if char_count(item) >= MIN_ITEM_CHARS {
        items.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(tokenize_items("").is_empty());
        assert!(tokenize_items("   \n  ").is_empty());
    }

    #[test]
    fn test_numbered_list_drops_short_items() {
        let items = tokenize_items(
            "1. Age ≥18 years at the time of consent\n2. Hi\n3. Must have measurable disease per RECIST criteria",
        );
        assert_eq!(
            items,
            vec![
                "Age ≥18 years at the time of consent",
                "Must have measurable disease per RECIST criteria",
            ]
        );
    }

    #[test]
    fn test_short_leading_item_is_noise() {
        let items = tokenize_items(
            "1. Age ≥18 years\n2. Hi\n3. Must have measurable disease per RECIST criteria",
        );
        assert_eq!(items, vec!["Must have measurable disease per RECIST criteria"]);
    }

    #[test]
    fn test_numbered_markers_inline() {
        let items = tokenize_items(
            "1. Histologically confirmed adenocarcinoma 2. Adequate bone marrow function 10. No prior systemic therapy",
        );
        assert_eq!(
            items,
            vec![
                "Histologically confirmed adenocarcinoma",
                "Adequate bone marrow function",
                "No prior systemic therapy",
            ]
        );
    }

    #[test]
    fn test_decimal_numbers_are_not_markers() {
        let items = tokenize_items("Measurable disease per RECIST 1.1 with at least one lesion");
        assert_eq!(
            items,
            vec!["Measurable disease per RECIST 1.1 with at least one lesion"]
        );
    }

    #[test]
    fn test_dash_bullets_split_but_compound_words_do_not() {
        let items = tokenize_items(
            "Non-small cell lung cancer confirmed - HER2-positive breast cancer allowed",
        );
        assert_eq!(
            items,
            vec![
                "Non-small cell lung cancer confirmed",
                "HER2-positive breast cancer allowed",
            ]
        );
    }

    #[test]
    fn test_dash_at_segment_edges_is_kept() {
        let items = tokenize_items("- Histologically confirmed adenocarcinoma of the lung");
        assert_eq!(
            items,
            vec!["- Histologically confirmed adenocarcinoma of the lung"]
        );

        let items = tokenize_items("Prior radiotherapy to the chest allowed -");
        assert_eq!(items, vec!["Prior radiotherapy to the chest allowed -"]);
    }

    #[test]
    fn test_bullet_glyphs_split() {
        let items = tokenize_items("• Adequate organ function required ▪ Life expectancy of 12 weeks");
        assert_eq!(
            items,
            vec![
                "Adequate organ function required",
                "Life expectancy of 12 weeks",
            ]
        );
    }

    #[test]
    fn test_duplicates_and_casing_preserved() {
        let items = tokenize_items("Signed informed consent form\nSIGNED INFORMED CONSENT FORM\nSigned informed consent form");
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], "SIGNED INFORMED CONSENT FORM");
        assert_eq!(items[0], items[2]);
    }

    #[test]
    fn test_length_floor_is_inclusive() {
        let exactly = "a".repeat(MIN_ITEM_CHARS);
        let shorter = "b".repeat(MIN_ITEM_CHARS - 1);
        let items = tokenize_items(&format!("{exactly}\n{shorter}"));
        assert_eq!(items, vec![exactly]);
    }
}
