//! Trial-level records that flow through the collect, preprocess and
//! extract stages.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::EntityMap;

/// Placeholder for registry fields that were missing from the response.
pub const NOT_AVAILABLE: &str = "N/A";

/// A trial as retrieved from the registry.
///
/// Missing fields take named defaults when the record is constructed, so
/// downstream stages never have to guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub nct_id: String,

    #[serde(default = "not_available", deserialize_with = "text_or_na")]
    pub title: String,

    #[serde(default = "not_available", deserialize_with = "text_or_na")]
    pub condition: String,

    #[serde(default = "not_available", deserialize_with = "text_or_na")]
    pub phase: String,

    #[serde(default)]
    pub enrollment: u64,

    /// Raw eligibility criteria text; empty when the registry had none.
    #[serde(default, deserialize_with = "lenient_text")]
    pub criteria_text: String,

    #[serde(default = "not_available", deserialize_with = "text_or_na")]
    pub min_age: String,

    #[serde(default = "not_available", deserialize_with = "text_or_na")]
    pub max_age: String,

    #[serde(default = "TrialRecord::default_sex")]
    pub sex: String,

    #[serde(default)]
    pub healthy_volunteers: bool,

    #[serde(default = "TrialRecord::default_data_source")]
    pub data_source: String,

    #[serde(default)]
    pub has_pdf: bool,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// A text field that reads as empty when it holds `null` or any non-string
/// value, so one malformed record does not reject a whole file.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(LenientText)
}

/// [`lenient_text`], with [`NOT_AVAILABLE`] in place of empty text.
fn text_or_na<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let text = lenient_text(deserializer)?;
    Ok(if text.is_empty() { not_available() } else { text })
}

struct LenientText;

impl<'de> Visitor<'de> for LenientText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or any other JSON value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<String, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(String::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<String, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(String::new())
    }
}

impl TrialRecord {
    /// Create a record with every optional field at its default.
    #[must_use]
    pub fn new(nct_id: impl Into<String>) -> Self {
        Self {
            nct_id: nct_id.into(),
            title: not_available(),
            condition: not_available(),
            phase: not_available(),
            enrollment: 0,
            criteria_text: String::new(),
            min_age: not_available(),
            max_age: not_available(),
            sex: Self::default_sex(),
            healthy_volunteers: false,
            data_source: Self::default_data_source(),
            has_pdf: false,
        }
    }

    fn default_sex() -> String {
        "ALL".to_string()
    }

    fn default_data_source() -> String {
        "api".to_string()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_criteria(mut self, criteria_text: impl Into<String>) -> Self {
        self.criteria_text = criteria_text.into();
        self
    }

    /// Whether the record carries any eligibility text worth processing.
    #[must_use]
    pub fn has_criteria(&self) -> bool {
        !self.criteria_text.trim().is_empty()
    }
}

/// Eligibility text separated into its inclusion and exclusion sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSplit {
    pub inclusion: String,
    pub exclusion: String,
}

impl CriteriaSplit {
    #[must_use]
    pub fn new(inclusion: impl Into<String>, exclusion: impl Into<String>) -> Self {
        Self {
            inclusion: inclusion.into(),
            exclusion: exclusion.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inclusion.is_empty() && self.exclusion.is_empty()
    }

    /// Whether an exclusion section was found.
    #[must_use]
    pub fn has_exclusion(&self) -> bool {
        !self.exclusion.is_empty()
    }
}

/// A trial after splitting and itemizing its criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTrial {
    #[serde(flatten)]
    pub trial: TrialRecord,

    #[serde(default, deserialize_with = "lenient_text")]
    pub inclusion_criteria: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub exclusion_criteria: String,

    #[serde(default)]
    pub inclusion_items: Vec<String>,

    #[serde(default)]
    pub exclusion_items: Vec<String>,

    #[serde(default)]
    pub num_inclusion: usize,

    #[serde(default)]
    pub num_exclusion: usize,
}

impl ProcessedTrial {
    /// Inclusion and exclusion text joined, for whole-document scans.
    #[must_use]
    pub fn combined_criteria(&self) -> String {
        format!("{} {}", self.inclusion_criteria, self.exclusion_criteria)
    }
}

/// Entities of both segments of one trial, kept apart by provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEntities {
    pub inclusion: EntityMap,
    pub exclusion: EntityMap,
}

impl SegmentEntities {
    #[must_use]
    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            inclusion: self.inclusion.total(),
            exclusion: self.exclusion.total(),
        }
    }
}

/// Number of entities found per segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub inclusion: usize,
    pub exclusion: usize,
}

impl EntityCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inclusion + self.exclusion
    }
}

/// Final per-trial output of the extraction stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub nct_id: String,
    pub title: String,
    pub condition: String,
    pub phase: String,
    pub inclusion_entities: EntityMap,
    pub exclusion_entities: EntityMap,
    pub inclusion_summary: String,
    pub exclusion_summary: String,
    pub entity_counts: EntityCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_trial_record_defaults_on_missing_fields() {
        let record: TrialRecord =
            serde_json::from_str(r#"{"nct_id": "NCT00000001"}"#).expect("valid JSON");

        assert_eq!(record, TrialRecord::new("NCT00000001"));
        assert_eq!(record.title, NOT_AVAILABLE);
        assert_eq!(record.sex, "ALL");
        assert!(!record.has_criteria());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_processed_trial_flattens_record() {
        let processed = ProcessedTrial {
            trial: TrialRecord::new("NCT00000002").with_title("A study"),
            inclusion_criteria: "Adults with measurable disease".to_string(),
            exclusion_criteria: String::new(),
            inclusion_items: vec!["Adults with measurable disease".to_string()],
            exclusion_items: Vec::new(),
            num_inclusion: 1,
            num_exclusion: 0,
        };

        let value = serde_json::to_value(&processed).expect("record should serialize");
        assert_eq!(value["nct_id"], "NCT00000002");
        assert_eq!(value["title"], "A study");
        assert_eq!(value["num_inclusion"], 1);

        let back: ProcessedTrial = serde_json::from_value(value).expect("valid JSON");
        assert_eq!(back, processed);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_null_and_non_string_text_read_as_absent() {
        let records: Vec<TrialRecord> = serde_json::from_str(
            r#"[
                {"nct_id": "NCT00000003", "criteria_text": null, "title": null},
                {"nct_id": "NCT00000004", "criteria_text": 42, "phase": ["PHASE2"]},
                {"nct_id": "NCT00000005", "criteria_text": "Adults with NSCLC"}
            ]"#,
        )
        .expect("malformed fields should not reject the batch");

        assert_eq!(records[0], TrialRecord::new("NCT00000003"));
        assert_eq!(records[1], TrialRecord::new("NCT00000004"));
        assert_eq!(records[2].criteria_text, "Adults with NSCLC");
        assert!(!records[0].has_criteria());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_processed_trial_accepts_null_sections() {
        let processed: ProcessedTrial = serde_json::from_str(
            r#"{"nct_id": "NCT00000006", "criteria_text": null,
                "inclusion_criteria": null, "exclusion_criteria": {"text": "x"}}"#,
        )
        .expect("null sections should deserialize");

        assert!(processed.inclusion_criteria.is_empty());
        assert!(processed.exclusion_criteria.is_empty());
        assert_eq!(processed.trial, TrialRecord::new("NCT00000006"));
    }

    #[test]
    fn test_criteria_split_flags() {
        assert!(CriteriaSplit::default().is_empty());
        let split = CriteriaSplit::new("adults", "");
        assert!(!split.is_empty());
        assert!(!split.has_exclusion());
    }
}
