//! The built-in pattern table.
//!
//! Each category owns an ordered list of phrase patterns, grouped by topic.
//! A pattern matches a complete semantic phrase ("non-small cell lung
//! cancer"), never a lone word of it. Capture group 1 is the entity text.
//! Matching is always case-insensitive, so the table is written lowercase.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trialex_core::EntityCategory;

/// Error type for pattern building.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The regex pattern is invalid.
    #[error("invalid regex in pattern {id}: {source}")]
    Regex {
        id: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern has no expression at all.
    #[error("pattern {0} has an empty expression")]
    Empty(String),

    /// Two definitions share an id.
    #[error("duplicate pattern id: {0}")]
    DuplicateId(String),
}

/// Definition of a single extraction pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDef {
    /// Unique identifier, `<category>.<group>.<index>` for built-ins.
    pub id: String,

    /// Topic group inside the category (`egfr`, `chemotherapy`, ...).
    pub group: String,

    /// Category the captured phrase belongs to.
    pub category: EntityCategory,

    /// Regex matched case-insensitively against the whole text.
    pub pattern: String,
}

impl PatternDef {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        group: impl Into<String>,
        category: EntityCategory,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            category,
            pattern: pattern.into(),
        }
    }

    /// Compile into a [`CompiledPattern`].
    ///
    /// # Errors
    /// Returns an error if the pattern is empty or not a valid regex.
    pub fn build(&self) -> Result<CompiledPattern, BuildError> {
        if self.pattern.trim().is_empty() {
            return Err(BuildError::Empty(self.id.clone()));
        }

        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| BuildError::Regex {
                id: self.id.clone(),
                source,
            })?;

        Ok(CompiledPattern {
            id: self.id.clone(),
            category: self.category,
            regex,
        })
    }
}

/// A pattern ready to run.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub id: String,
    pub category: EntityCategory,
    regex: Regex,
}

impl CompiledPattern {
    /// Every non-overlapping occurrence of this pattern in `text`, trimmed
    /// and lowercased.
    ///
    /// The entity is capture group 1, or the whole match when the pattern
    /// has no group.
    pub fn phrases<'t>(&'t self, text: &'t str) -> impl Iterator<Item = String> + 't {
        self.regex.captures_iter(text).filter_map(|caps| {
            let span = caps.get(1).or_else(|| caps.get(0))?;
            let phrase = span.as_str().trim();
            (!phrase.is_empty()).then(|| phrase.to_lowercase())
        })
    }
}

/// Optional comparison glyph in front of a threshold.
const CMP: &str = r"(?:[≥≤]|[<>]=?)?";

/// Cell count with optional thousands separators or decimals: `1,500`,
/// `100,000`, `1.5`.
const COUNT: &str = r"\d+(?:,\d{3})*(?:\.\d+)?";

/// Decimal number: `1.5`, `60`.
const DEC: &str = r"\d+(?:\.\d+)?";

/// Optional unit of a cell count: `/μL`, `/mm3` or `× 10^9/L`.
const CELL_UNIT: &str = r"(?:\s*/\s*(?:μl|mm3|mm³)|\s*(?:x|×)\s*10\^?9\s*/\s*l\b)?";

/// Optional multiple of the upper limit of normal: `× ULN`, `times the upper limit of normal`.
const ULN: &str = r"(?:\s*(?:times|x|×)?\s*(?:the\s+)?(?:uln|upper limit of normal)\b)?";

/// Default pattern table, in matching order.
#[must_use]
pub fn default_patterns() -> Vec<PatternDef> {
    let mut patterns = Vec::new();
    patterns.extend(named_cancer_patterns());
    patterns.extend(generic_cancer_patterns());
    patterns.extend(disease_state_patterns());
    patterns.extend(drug_name_patterns());
    patterns.extend(chemotherapy_patterns());
    patterns.extend(treatment_class_patterns());
    patterns.extend(her2_patterns());
    patterns.extend(hormone_receptor_patterns());
    patterns.extend(pd_l1_patterns());
    patterns.extend(egfr_patterns());
    patterns.extend(fusion_driver_patterns());
    patterns.extend(kras_braf_patterns());
    patterns.extend(brca_patterns());
    patterns.extend(msi_tmb_patterns());
    patterns.extend(generic_alteration_patterns());
    patterns.extend(lab_threshold_patterns());
    patterns.extend(lab_name_patterns());
    patterns.extend(procedure_patterns());
    patterns
}

fn group<S: AsRef<str>>(category: EntityCategory, group: &str, patterns: &[S]) -> Vec<PatternDef> {
    let prefix = category.as_str().to_lowercase();
    patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| {
            PatternDef::new(
                format!("{prefix}.{group}.{i:02}"),
                group,
                category,
                pattern.as_ref(),
            )
        })
        .collect()
}

// ========== DISEASE ==========

/// Specific cancer types, matched as whole names.
fn named_cancer_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Disease,
        "named_cancer",
        &[
            r"\b(non[- ]?small[- ]?cell lung cancer)\b",
            r"\b(small[- ]?cell lung cancer)\b",
            r"\b(triple[- ]?negative breast cancer)\b",
            r"\b(her2[- ]?positive breast cancer)\b",
            r"\b(hormone receptor[- ]?positive breast cancer)\b",
            r"\b(metastatic breast cancer)\b",
            r"\b(advanced breast cancer)\b",
            r"\b(metastatic lung cancer)\b",
            r"\b(advanced lung cancer)\b",
            r"\b(metastatic (?:colorectal|colon|rectal) cancer)\b",
            r"\b(hepatocellular carcinoma)\b",
            r"\b(renal cell carcinoma)\b",
            r"\b(squamous cell carcinoma)\b",
            r"\b(urothelial carcinoma)\b",
            r"\b(acute myeloid leukemia)\b",
            r"\b(acute lymphoblastic leukemia)\b",
            r"\b(chronic lymphocytic leukemia)\b",
            r"\b(chronic myeloid leukemia)\b",
            r"\b(hodgkin(?:['’]?s)? lymphoma)\b",
            r"\b(non[- ]?hodgkin(?:['’]?s)? lymphoma)\b",
            r"\b(diffuse large b[- ]?cell lymphoma)\b",
            r"\b(multiple myeloma)\b",
            r"\b((?:metastatic |advanced |unresectable )?melanoma)\b",
            r"\b(glioblastoma(?: multiforme)?)\b",
            r"\b((?:malignant )?(?:pleural )?mesothelioma)\b",
        ],
    )
}

/// Organ + cancer/carcinoma combinations and broad disease descriptions.
fn generic_cancer_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Disease,
        "generic_cancer",
        &[
            r"\b((?:lung|breast|colon|colorectal|liver|pancreatic|kidney|ovarian|prostate|gastric|brain|bladder|cervical|endometrial|esophageal|thyroid)\s+cancer)\b",
            r"\b((?:lung|breast|colon|liver|pancreatic|kidney|ovarian|prostate|gastric)\s+carcinoma)\b",
            r"\b(metastatic\s+(?:disease|cancer|carcinoma))\b",
            r"\b(advanced\s+(?:cancer|carcinoma|disease))\b",
            r"\b(recurrent\s+(?:cancer|carcinoma|disease))\b",
        ],
    )
}

/// Stage and resectability descriptions, and CNS involvement.
fn disease_state_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Disease,
        "disease_state",
        &[
            r"\b(stage\s+(?:I{1,3}V?|[1234])\s+(?:cancer|carcinoma|disease))\b",
            r"\b(locally advanced (?:cancer|carcinoma|disease))\b",
            r"\b(unresectable (?:cancer|carcinoma|disease|tumor))\b",
            r"\b((?:active |untreated |symptomatic )?(?:brain|cns|central nervous system) metastas[ie]s)\b",
            r"\b(leptomeningeal disease)\b",
        ],
    )
}

// ========== DRUG ==========

/// Immunotherapy and targeted agents. Generic and trade names share a
/// pattern; whichever spelling appears is what gets captured.
fn drug_name_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Drug,
        "drug_name",
        &[
            r"\b(pembrolizumab|keytruda)\b",
            r"\b(nivolumab|opdivo)\b",
            r"\b(atezolizumab|tecentriq)\b",
            r"\b(durvalumab|imfinzi)\b",
            r"\b(ipilimumab|yervoy)\b",
            r"\b(cemiplimab|libtayo)\b",
            r"\b(trastuzumab deruxtecan|enhertu)\b",
            r"\b(trastuzumab|herceptin)\b",
            r"\b(pertuzumab|perjeta)\b",
            r"\b(bevacizumab|avastin)\b",
            r"\b(rituximab|rituxan)\b",
            r"\b(cetuximab|erbitux)\b",
            r"\b(panitumumab|vectibix)\b",
            r"\b(osimertinib|tagrisso)\b",
            r"\b(olaparib|lynparza)\b",
            r"\b(sotorasib|lumakras)\b",
        ],
    )
}

fn chemotherapy_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Drug,
        "chemotherapy",
        &[
            r"\b(cisplatin)\b",
            r"\b(carboplatin)\b",
            r"\b(oxaliplatin)\b",
            r"\b(paclitaxel|taxol)\b",
            r"\b(nab[- ]?paclitaxel|abraxane)\b",
            r"\b(docetaxel|taxotere)\b",
            r"\b(gemcitabine|gemzar)\b",
            r"\b(pemetrexed|alimta)\b",
            r"\b(5[- ]?fluorouracil|5[- ]?fu)\b",
            r"\b(capecitabine|xeloda)\b",
            r"\b(doxorubicin|adriamycin)\b",
            r"\b(etoposide)\b",
            r"\b(irinotecan)\b",
            r"\b(cyclophosphamide)\b",
        ],
    )
}

/// Treatment classes of two or more words.
fn treatment_class_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Drug,
        "treatment_class",
        &[
            r"\b(platinum[- ]?based chemotherapy)\b",
            r"\b(prior (?:systemic |immune |chemo)?therapy)\b",
            r"\b((?:immune )?checkpoint inhibitors?)\b",
            r"\b(pd[- ]?1 inhibitors?)\b",
            r"\b(pd[- ]?l1 inhibitors?)\b",
            r"\b(ctla[- ]?4 inhibitors?)\b",
            r"\b(anti[- ]?pd[- ]?(?:1|l1) (?:antibody|antibodies|therapy))\b",
            r"\b(tyrosine kinase inhibitors?)\b",
            r"\b(egfr[- ]?tkis?)\b",
            r"\b(targeted therapy)\b",
            r"\b(systemic therapy)\b",
            r"\b(anti[- ]?cancer therapy)\b",
            r"\b((?:hormone|endocrine) therapy)\b",
            r"\b(immunotherapy)\b",
        ],
    )
}

// ========== BIOMARKER ==========

// Symbol-suffixed markers ("her2+", "er-") cannot end on a word boundary,
// so they require a non-word character or the end of text after the symbol
// instead. That character sits outside the capture group.

fn her2_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "her2",
        &[
            r"\b(her2[- ]?positive)\b",
            r"\b(her2\+)(?:\W|$)",
            r"\b(her2[- ]?negative)\b",
            r"\b(her2-)(?:\W|$)",
            r"\b(her2[- ]?low)\b",
            r"\b(her2 amplification)\b",
            r"\b(her2 overexpression)\b",
            r"\b(her2 status)\b",
            r"\b(her2[- ]?target(?:ing|ed))\b",
        ],
    )
}

fn hormone_receptor_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "hormone_receptor",
        &[
            r"\b(er[- ]?positive|estrogen receptor[- ]?positive)\b",
            r"\b(er\+)(?:\W|$)",
            r"\b(er[- ]?negative|estrogen receptor[- ]?negative)\b",
            r"\b(er-)(?:\W|$)",
            r"\b(pr[- ]?positive|progesterone receptor[- ]?positive)\b",
            r"\b(pr\+)(?:\W|$)",
            r"\b(pr[- ]?negative|progesterone receptor[- ]?negative)\b",
            r"\b(pr-)(?:\W|$)",
            r"\b(hormone receptor[- ]?(?:positive|negative))\b",
        ],
    )
}

fn pd_l1_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "pd_l1",
        &[
            r"\b(pd[- ]?l1 (?:positive|expression|status))\b",
            r"\b(pd[- ]?l1 (?:sp[- ]?142|sp[- ]?263|22c3|28[- ]?8))\b",
            r"\b(pd[- ]?l1 ic score)\b",
            r"\b(pd[- ]?l1 tps)\b",
            r"\b(pd[- ]?l1 tumor proportion score)\b",
            r"\b(pd[- ]?l1\s*(?:expression\s*)?[≥>]=?\s*\d+\s*%)",
            r"\b(pdl1[- ]?positive)\b",
        ],
    )
}

fn egfr_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "egfr",
        &[
            r"\b(egfr[- ]?positive)\b",
            r"\b(egfr sensitizing mutations?)\b",
            r"\b(egfr activating mutations?)\b",
            r"\b(egfr mutations?)\b",
            r"\b(egfr exon (?:18|19|20|21))\b",
            r"\b(egfr (?:exon 19 deletion|exon 20 insertion|del19))\b",
            r"\b(egfr l858r)\b",
            r"\b(egfr t790m)\b",
            r"\b(egfr wild[- ]?type)\b",
            r"\b(egfr[- ]?mutant)\b",
            r"\b(egfr[- ]?mutated)\b",
        ],
    )
}

/// ALK, ROS1, NTRK, RET and MET alterations.
fn fusion_driver_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "fusion_driver",
        &[
            r"\b(alk[- ]?positive)\b",
            r"\b(alk fusion)\b",
            r"\b(alk rearrangement)\b",
            r"\b(alk translocation)\b",
            r"\b(ros1[- ]?positive)\b",
            r"\b(ros1 fusion)\b",
            r"\b(ros1 rearrangement)\b",
            r"\b(ntrk[123]? fusion)\b",
            r"\b(ntrk[123]? rearrangement)\b",
            r"\b(ntrk[- ]?positive)\b",
            r"\b(ret (?:fusion|rearrangement))\b",
            r"\b(met exon 14 skipping)\b",
        ],
    )
}

fn kras_braf_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "kras_braf",
        &[
            r"\b(kras mutations?)\b",
            r"\b(kras[- ]?mutant)\b",
            r"\b(kras wild[- ]?type)\b",
            r"\b(kras g12c)\b",
            r"\b(braf v600e)\b",
            r"\b(braf v600k)\b",
            r"\b(braf v600)\b",
            r"\b(braf mutations?)\b",
            r"\b(braf[- ]?mutant)\b",
            r"\b(braf wild[- ]?type)\b",
            r"\b(pik3ca mutations?)\b",
        ],
    )
}

fn brca_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "brca",
        &[
            r"\b(brca(?:1/2|1|2)?\s+mutations?)\b",
            r"\b(brca[12]?[- ]?mutant)\b",
            r"\b(brca[12]?[- ]?mutated)\b",
        ],
    )
}

/// Microsatellite instability, mismatch repair and mutational burden.
fn msi_tmb_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "msi_tmb",
        &[
            r"\b(msi[- ]?high)\b",
            r"\b(msi[- ]?h)\b",
            r"\b(microsatellite instability[- ]?high)\b",
            r"\b(mmr[- ]?deficient)\b",
            r"\b(dmmr)\b",
            r"\b(mismatch repair[- ]?deficient)\b",
            r"\b(tmb[- ]?high)\b",
            r"\b(tumor mutational burden[- ]?high)\b",
            r"\b(high tumor mutational burden)\b",
        ],
    )
}

fn generic_alteration_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Biomarker,
        "generic_alteration",
        &[
            r"\b(targetable (?:genomic aberration|alteration|mutation)s?)\b",
            r"\b(actionable mutations?)\b",
            r"\b(driver mutations?)\b",
            r"\b(sensitizing mutations?)\b",
            r"\b(activating mutations?)\b",
        ],
    )
}

// ========== LAB_TEST ==========

/// Lab requirements with their threshold. The number and unit stay in the
/// captured phrase so they can be parsed again downstream.
fn lab_threshold_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::LabTest,
        "lab_threshold",
        &[
            format!(
                r"\b(ecog performance status\s*(?:of\s+)?{CMP}\s*[0-5](?:\s*(?:-|to|or)\s*[0-5])?)\b"
            ),
            format!(r"\b(karnofsky performance status\s*(?:of\s+)?{CMP}\s*\d+(?:\s*%)?)"),
            format!(r"\b(kps\s*{CMP}\s*\d+(?:\s*%)?)"),
            format!(
                r"\b(absolute neutrophil count\s*(?:\(anc\)\s*)?{CMP}\s*{COUNT}{CELL_UNIT})"
            ),
            format!(r"\b(anc\s*{CMP}\s*{COUNT}{CELL_UNIT})"),
            format!(r"\b(platelet(?:s| count)\s*{CMP}\s*{COUNT}{CELL_UNIT})"),
            format!(r"\b(white blood cell count\s*{CMP}\s*{COUNT}{CELL_UNIT})"),
            format!(r"\b(wbc\s*{CMP}\s*{COUNT}{CELL_UNIT})"),
            format!(r"\b((?:hemoglobin|haemoglobin|hgb)\s*{CMP}\s*{DEC}(?:\s*(?:g/dl|g/l)\b)?)"),
            format!(r"\b(creatinine clearance\s*(?:\(crcl\)\s*)?{CMP}\s*\d+(?:\s*ml/min\b)?)"),
            format!(r"\b(estimated glomerular filtration rate\s*{CMP}\s*\d+(?:\s*ml/min\b)?)"),
            // Comparator required: a bare "EGFR 19" is a mutation, not a lab value.
            r"\b(egfr\s*(?:[≥≤]|[<>]=?)\s*\d+(?:\s*ml/min\b)?)".to_string(),
            format!(r"\b(serum creatinine\s*{CMP}\s*{DEC}(?:\s*mg/dl\b)?{ULN})"),
            format!(r"\b(total bilirubin\s*{CMP}\s*{DEC}(?:\s*mg/dl\b)?{ULN})"),
            format!(r"\b((?:ast|alt|sgot|sgpt)\s*(?:\((?:sgot|sgpt)\)\s*)?{CMP}\s*{DEC}{ULN})"),
            format!(r"\b(alkaline phosphatase\s*{CMP}\s*{DEC}{ULN})"),
            format!(r"\b(serum albumin\s*{CMP}\s*{DEC}(?:\s*(?:g/dl|g/l)\b)?)"),
            format!(r"\b(international normalized ratio\s*(?:\(inr\)\s*)?{CMP}\s*{DEC})"),
            format!(r"\b(inr\s*{CMP}\s*{DEC})"),
            format!(
                r"\b(left ventricular ejection fraction\s*(?:\(lvef\)\s*)?{CMP}\s*\d+(?:\s*%)?)"
            ),
            format!(r"\b(lvef\s*{CMP}\s*\d+(?:\s*%)?)"),
        ],
    )
}

/// Lab names without a number, for criteria that defer the threshold
/// ("adequate absolute neutrophil count").
fn lab_name_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::LabTest,
        "lab_name",
        &[
            r"\b(absolute neutrophil count)\b",
            r"\b(creatinine clearance)\b",
            r"\b(total bilirubin)\b",
            r"\b(serum creatinine)\b",
            r"\b(left ventricular ejection fraction)\b",
            r"\b(platelet count)\b",
            r"\b(ecog performance status)\b",
        ],
    )
}

// ========== PROCEDURE ==========

fn procedure_patterns() -> Vec<PatternDef> {
    group(
        EntityCategory::Procedure,
        "procedure",
        &[
            r"\b(tumor biopsy)\b",
            r"\b(core needle biopsy)\b",
            r"\b(liquid biopsy)\b",
            r"\b(surgical resection)\b",
            r"\b(definitive surgery)\b",
            r"\b(major surgery)\b",
            r"\b(stem cell transplant(?:ation)?)\b",
            r"\b(allogeneic stem cell transplant(?:ation)?)\b",
            r"\b(bone marrow transplant(?:ation)?)\b",
            r"\b(radiation therapy)\b",
            r"\b(definitive radiotherapy)\b",
            r"\b(palliative radiotherapy)\b",
            r"\b(whole[- ]brain radiotherapy)\b",
            r"\b(stereotactic radiosurgery)\b",
        ],
    )
}
