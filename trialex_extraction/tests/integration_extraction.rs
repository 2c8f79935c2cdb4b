//! Integration tests for the three core operations.
//!
//! These tests drive split, tokenize and match through the public API only.

use trialex_core::EntityCategory;
use trialex_extraction::{extract_entities, split_criteria, tokenize_items};

const NSCLC_CRITERIA: &str = "Patients with non-small cell lung cancer and EGFR exon 19 deletion are \
     eligible. ECOG performance status 0-1. Absolute neutrophil count ≥1,500/μL, platelets \
     ≥100,000/mm3, total bilirubin ≤1.5 × ULN, PD-L1 expression ≥50%. Prior treatment with \
     pembrolizumab (Keytruda) or platinum-based chemotherapy is allowed.";

/// Short inputs never produce a split or entities.
#[test]
fn test_short_inputs_are_empty() {
    for text in ["", "Adults", "ECOG 0-1"] {
        assert!(split_criteria(text).is_empty(), "{text:?}");
    }
    for text in ["", "HER2+ NSCLC", "ANC ≥1,500/μL", "EGFR mutation"] {
        assert!(extract_entities(text).is_empty(), "{text:?}");
    }
}

/// Headers are consumed and each side holds only its own text.
#[test]
fn test_split_on_headers() {
    let split = split_criteria("Inclusion Criteria: A. Exclusion Criteria: B.");
    assert!(split.inclusion.contains("A."));
    assert!(split.exclusion.contains("B."));
    for side in [&split.inclusion, &split.exclusion] {
        assert!(!side.to_lowercase().contains("criteria"));
    }
}

/// Compound disease names come out whole.
#[test]
fn test_nsclc_extraction() {
    let entities = extract_entities(NSCLC_CRITERIA);

    let diseases = entities.entities(EntityCategory::Disease);
    assert!(diseases.iter().any(|d| d == "non-small cell lung cancer"));
    for fragment in ["non", "small", "cell"] {
        assert!(!diseases.iter().any(|d| d == fragment));
    }

    assert!(entities.contains(EntityCategory::Biomarker, "egfr exon 19 deletion"));
    assert!(entities.contains(EntityCategory::Biomarker, "pd-l1 expression ≥50%"));
    assert!(entities.contains(EntityCategory::Drug, "platinum-based chemotherapy"));
    assert!(entities.contains(EntityCategory::Drug, "keytruda"));
    assert!(entities.contains(EntityCategory::LabTest, "total bilirubin ≤1.5 × uln"));
}

/// Lab thresholds keep their digits and separators.
#[test]
fn test_lab_threshold_phrase() {
    let entities = extract_entities("Absolute neutrophil count ≥1,500/μL required.");
    assert!(
        entities
            .entities(EntityCategory::LabTest)
            .iter()
            .any(|lab| lab.contains("1,500"))
    );
}

/// The same biomarker is found no matter which section it appears in.
#[test]
fn test_biomarker_in_either_section() {
    for text in ["EGFR mutation required", "EGFR mutation excluded"] {
        assert!(
            extract_entities(text).contains(EntityCategory::Biomarker, "egfr mutation"),
            "{text:?}"
        );
    }
}

/// Every list is strictly ascending.
#[test]
fn test_entity_lists_are_sorted_and_distinct() {
    let entities = extract_entities(&NSCLC_CRITERIA.repeat(3));
    for (category, phrases) in entities.iter() {
        assert!(!phrases.is_empty(), "{category} should be omitted when empty");
        assert!(phrases.windows(2).all(|w| w[0] < w[1]), "{category}: {phrases:?}");
    }
}

/// A matched phrase, extracted again on its own, is found unchanged.
#[test]
fn test_normalization_is_idempotent() {
    let entities = extract_entities(NSCLC_CRITERIA);
    let mut checked = 0;

    for (category, phrases) in entities.iter() {
        for phrase in phrases.iter().filter(|p| p.chars().count() >= 20) {
            assert!(
                extract_entities(phrase).contains(category, phrase),
                "{category}: {phrase:?}"
            );
            checked += 1;
        }
    }

    assert!(checked >= 5);
}

/// Tokenizing the split sections of a realistic record.
#[test]
fn test_split_then_tokenize() {
    let raw = "Inclusion Criteria:\n\
        • Age ≥ 18 years at the time of signing consent\n\
        • Hi\n\
        • Histologically confirmed metastatic breast cancer\n\
        Exclusion Criteria:\n\
        1. Active brain metastases requiring steroids\n\
        2. Major surgery within 4 weeks of enrollment";

    let split = split_criteria(raw);
    let inclusion = tokenize_items(&split.inclusion);
    let exclusion = tokenize_items(&split.exclusion);

    // Bullet glyphs are removed during cleaning, so the inclusion side is one run of text.
    assert_eq!(inclusion.len(), 1);
    assert!(inclusion[0].starts_with("Age ≥ 18 years"));
    assert!(inclusion[0].ends_with("metastatic breast cancer"));

    assert_eq!(
        exclusion,
        vec![
            "Active brain metastases requiring steroids",
            "Major surgery within 4 weeks of enrollment",
        ]
    );

    let entities = extract_entities(&split.exclusion);
    assert!(entities.contains(EntityCategory::Disease, "active brain metastases"));
    assert!(entities.contains(EntityCategory::Procedure, "major surgery"));
}
