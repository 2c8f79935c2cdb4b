//! Corpus-level aggregates over extraction results.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use trialex_core::{EntityCategory, ExtractionRecord};

use crate::thresholds::{LabMeasure, find_threshold};

/// Length of the most-frequent-entities list.
pub const TOP_ENTITIES: usize = 20;

/// Length of the biomarker landscape.
pub const TOP_BIOMARKERS: usize = 15;

/// Therapeutic context a biomarker points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomarkerClass {
    PdL1,
    DriverMutation,
    Her2,
    MsiMmr,
    Other,
}

impl BiomarkerClass {
    /// Classify by keyword, checking PD-L1 first.
    #[must_use]
    pub fn classify(marker: &str) -> Self {
        let has = |keys: &[&str]| keys.iter().any(|k| marker.contains(k));

        if has(&["pd-l1", "pd l1", "pdl1"]) {
            Self::PdL1
        } else if has(&["egfr", "alk", "braf"]) {
            Self::DriverMutation
        } else if has(&["her2"]) {
            Self::Her2
        } else if has(&["msi", "mmr"]) {
            Self::MsiMmr
        } else {
            Self::Other
        }
    }
}

/// Treatment modality of a drug or treatment-class phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentClass {
    Immunotherapy,
    Targeted,
    Chemotherapy,
}

impl TreatmentClass {
    #[must_use]
    pub fn classify(drug: &str) -> Option<Self> {
        let has = |keys: &[&str]| keys.iter().any(|k| drug.contains(k));

        if has(&["pembrolizumab", "nivolumab", "checkpoint", "pd-1", "pd-l1"]) {
            Some(Self::Immunotherapy)
        } else if has(&["targeted", "inhibitor", "her2"]) {
            Some(Self::Targeted)
        } else if has(&["platinum", "chemo", "cisplatin", "carboplatin"]) {
            Some(Self::Chemotherapy)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFrequency {
    pub phrase: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiomarkerFrequency {
    pub phrase: String,
    pub count: usize,
    pub class: BiomarkerClass,
}

/// Summary statistics of an extraction run.
///
/// Frequencies count trials, since each record lists a phrase at most once
/// per category. Only inclusion entities feed the frequency tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionStats {
    pub trials: usize,
    pub inclusion_entities: usize,
    pub exclusion_entities: usize,
    pub average_per_trial: f64,
    pub top_entities: Vec<EntityFrequency>,
    pub category_counts: BTreeMap<EntityCategory, usize>,
    pub biomarker_landscape: Vec<BiomarkerFrequency>,
    /// Distinct inclusion drug phrases per modality.
    pub treatment_classes: BTreeMap<TreatmentClass, usize>,
    /// Threshold value -> number of trials stating it.
    pub lab_thresholds: BTreeMap<LabMeasure, BTreeMap<u32, usize>>,
}

impl ExtractionStats {
    #[must_use]
    pub fn from_records(records: &[ExtractionRecord]) -> Self {
        let trials = records.len();
        let inclusion_entities: usize = records.iter().map(|r| r.entity_counts.inclusion).sum();
        let exclusion_entities: usize = records.iter().map(|r| r.entity_counts.exclusion).sum();
        let average_per_trial = if trials == 0 {
            0.0
        } else {
            (inclusion_entities + exclusion_entities) as f64 / trials as f64
        };

        let mut phrase_counts: HashMap<&str, usize> = HashMap::new();
        let mut biomarker_counts: HashMap<&str, usize> = HashMap::new();
        let mut category_counts = BTreeMap::new();
        let mut drugs_by_class: BTreeMap<TreatmentClass, BTreeSet<&str>> = BTreeMap::new();

        for record in records {
            for (category, phrases) in record.inclusion_entities.iter() {
                *category_counts.entry(category).or_insert(0) += phrases.len();

                for phrase in phrases {
                    *phrase_counts.entry(phrase.as_str()).or_insert(0) += 1;

                    match category {
                        EntityCategory::Biomarker => {
                            *biomarker_counts.entry(phrase.as_str()).or_insert(0) += 1;
                        }
                        EntityCategory::Drug => {
                            if let Some(class) = TreatmentClass::classify(phrase) {
                                drugs_by_class.entry(class).or_default().insert(phrase);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        let top_entities = most_common(phrase_counts, TOP_ENTITIES)
            .into_iter()
            .map(|(phrase, count)| EntityFrequency { phrase, count })
            .collect();

        let biomarker_landscape = most_common(biomarker_counts, TOP_BIOMARKERS)
            .into_iter()
            .map(|(phrase, count)| BiomarkerFrequency {
                class: BiomarkerClass::classify(&phrase),
                phrase,
                count,
            })
            .collect();

        let treatment_classes = drugs_by_class
            .into_iter()
            .map(|(class, drugs)| (class, drugs.len()))
            .collect();

        Self {
            trials,
            inclusion_entities,
            exclusion_entities,
            average_per_trial,
            top_entities,
            category_counts,
            biomarker_landscape,
            treatment_classes,
            lab_thresholds: BTreeMap::new(),
        }
    }

    /// Add threshold histograms from the criteria text of each trial.
    ///
    /// Each text contributes at most one value per measure, the first one
    /// stated.
    #[must_use]
    pub fn with_lab_thresholds<I, S>(mut self, criteria_texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in criteria_texts {
            for measure in LabMeasure::ALL {
                if let Some(value) = find_threshold(measure, text.as_ref()) {
                    *self
                        .lab_thresholds
                        .entry(measure)
                        .or_default()
                        .entry(value)
                        .or_insert(0) += 1;
                }
            }
        }
        self
    }
}

/// The `limit` highest counts, ties broken alphabetically.
fn most_common(counts: HashMap<&str, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(phrase, count)| (phrase.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialex_core::{EntityCounts, EntityMap};

    fn record(nct_id: &str, inclusion: &[(EntityCategory, &str)], exclusion: usize) -> ExtractionRecord {
        let mut sets: BTreeMap<EntityCategory, BTreeSet<String>> = BTreeMap::new();
        for (category, phrase) in inclusion {
            sets.entry(*category).or_default().insert((*phrase).to_string());
        }
        let inclusion_entities = EntityMap::from_sets(sets);
        let entity_counts = EntityCounts {
            inclusion: inclusion_entities.total(),
            exclusion,
        };

        ExtractionRecord {
            nct_id: nct_id.to_string(),
            title: "N/A".to_string(),
            condition: "N/A".to_string(),
            phase: "N/A".to_string(),
            inclusion_entities,
            exclusion_entities: EntityMap::new(),
            inclusion_summary: String::new(),
            exclusion_summary: String::new(),
            entity_counts,
        }
    }

    fn sample() -> Vec<ExtractionRecord> {
        use EntityCategory::{Biomarker, Disease, Drug};

        vec![
            record(
                "NCT1",
                &[
                    (Disease, "lung cancer"),
                    (Biomarker, "pd-l1 expression"),
                    (Biomarker, "egfr mutation"),
                    (Drug, "pembrolizumab"),
                    (Drug, "carboplatin"),
                ],
                3,
            ),
            record(
                "NCT2",
                &[
                    (Disease, "lung cancer"),
                    (Disease, "breast cancer"),
                    (Biomarker, "her2-positive"),
                    (Drug, "pembrolizumab"),
                    (Drug, "tyrosine kinase inhibitor"),
                ],
                1,
            ),
        ]
    }

    #[test]
    fn test_totals_and_average() {
        let stats = ExtractionStats::from_records(&sample());
        assert_eq!(stats.trials, 2);
        assert_eq!(stats.inclusion_entities, 10);
        assert_eq!(stats.exclusion_entities, 4);
        assert!((stats.average_per_trial - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_input() {
        let stats = ExtractionStats::from_records(&[]);
        assert_eq!(stats.trials, 0);
        assert!(stats.average_per_trial.abs() < f64::EPSILON);
        assert!(stats.top_entities.is_empty());
    }

    #[test]
    fn test_top_entities_ranked_by_count_then_phrase() {
        let stats = ExtractionStats::from_records(&sample());
        assert_eq!(stats.top_entities.len(), 8);
        assert_eq!(stats.top_entities[0].phrase, "lung cancer");
        assert_eq!(stats.top_entities[0].count, 2);
        assert_eq!(stats.top_entities[1].phrase, "pembrolizumab");
        assert_eq!(stats.top_entities[2].phrase, "breast cancer");
        assert_eq!(stats.top_entities[2].count, 1);
    }

    #[test]
    fn test_category_counts() {
        let stats = ExtractionStats::from_records(&sample());
        assert_eq!(stats.category_counts[&EntityCategory::Disease], 3);
        assert_eq!(stats.category_counts[&EntityCategory::Biomarker], 3);
        assert_eq!(stats.category_counts[&EntityCategory::Drug], 4);
        assert!(!stats.category_counts.contains_key(&EntityCategory::LabTest));
    }

    #[test]
    fn test_biomarker_classes() {
        assert_eq!(BiomarkerClass::classify("pd-l1 tps"), BiomarkerClass::PdL1);
        assert_eq!(BiomarkerClass::classify("braf v600e"), BiomarkerClass::DriverMutation);
        assert_eq!(BiomarkerClass::classify("her2+"), BiomarkerClass::Her2);
        assert_eq!(BiomarkerClass::classify("msi-high"), BiomarkerClass::MsiMmr);
        assert_eq!(BiomarkerClass::classify("brca mutation"), BiomarkerClass::Other);

        let stats = ExtractionStats::from_records(&sample());
        let classes: Vec<_> = stats.biomarker_landscape.iter().map(|b| b.class).collect();
        assert_eq!(
            classes,
            vec![
                BiomarkerClass::DriverMutation,
                BiomarkerClass::Her2,
                BiomarkerClass::PdL1
            ]
        );
    }

    #[test]
    fn test_treatment_classes_count_distinct_drugs() {
        let stats = ExtractionStats::from_records(&sample());
        assert_eq!(stats.treatment_classes[&TreatmentClass::Immunotherapy], 1);
        assert_eq!(stats.treatment_classes[&TreatmentClass::Targeted], 1);
        assert_eq!(stats.treatment_classes[&TreatmentClass::Chemotherapy], 1);
        assert_eq!(TreatmentClass::classify("docetaxel"), None);
    }

    #[test]
    fn test_lab_threshold_histograms() {
        let stats = ExtractionStats::default().with_lab_thresholds([
            "Absolute neutrophil count ≥1,500/μL and creatinine clearance ≥ 60 mL/min",
            "ANC: neutrophil count ≥ 1500; creatinine clearance > 45",
            "No lab requirements stated",
        ]);

        let anc = &stats.lab_thresholds[&LabMeasure::AbsoluteNeutrophilCount];
        assert_eq!(anc.get(&1500), Some(&2));

        let crcl = &stats.lab_thresholds[&LabMeasure::CreatinineClearance];
        assert_eq!(crcl.len(), 2);
        assert_eq!(crcl.get(&60), Some(&1));
        assert!(!stats.lab_thresholds.contains_key(&LabMeasure::PlateletCount));
    }
}
