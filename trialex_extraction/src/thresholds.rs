//! Numeric lab thresholds for benchmarking across trials.
//!
//! These scans are narrower than the LAB_TEST patterns: they read only the
//! number that follows a lab name, with thousands separators removed.
//! Cell counts written per litre (`1.5 × 10^9/L`) are converted to cells/μL.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::builtin_regex;

static ANC_VALUE: Lazy<Regex> = Lazy::new(|| {
    builtin_regex(
        r"(?i)neutrophil count\s*(?:\(anc\)\s*)?(?:[≥>]=?)?\s*(\d+(?:,\d{3})*(?:\.\d+)?)(\s*(?:x|×)\s*10\^?9\s*/\s*l\b)?",
    )
});
static CRCL_VALUE: Lazy<Regex> = Lazy::new(|| {
    builtin_regex(r"(?i)creatinine clearance\s*(?:\(crcl\)\s*)?(?:[≥>]=?)?\s*(\d+(?:\.\d+)?)")
});
static PLATELET_VALUE: Lazy<Regex> = Lazy::new(|| {
    builtin_regex(
        r"(?i)platelet(?:s| count)\s*(?:[≥>]=?)?\s*(\d+(?:,\d{3})*(?:\.\d+)?)(\s*(?:x|×)\s*10\^?9\s*/\s*l\b)?",
    )
});

/// Lab measures whose minimum thresholds are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabMeasure {
    AbsoluteNeutrophilCount,
    CreatinineClearance,
    PlateletCount,
}

impl LabMeasure {
    pub const ALL: [Self; 3] = [
        Self::AbsoluteNeutrophilCount,
        Self::CreatinineClearance,
        Self::PlateletCount,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AbsoluteNeutrophilCount => "absolute_neutrophil_count",
            Self::CreatinineClearance => "creatinine_clearance",
            Self::PlateletCount => "platelet_count",
        }
    }

    /// Unit the threshold is usually written in.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::AbsoluteNeutrophilCount | Self::PlateletCount => "cells/μL",
            Self::CreatinineClearance => "mL/min",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::AbsoluteNeutrophilCount => &ANC_VALUE,
            Self::CreatinineClearance => &CRCL_VALUE,
            Self::PlateletCount => &PLATELET_VALUE,
        }
    }
}

impl std::fmt::Display for LabMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first threshold stated for `measure` in `text`, in [`LabMeasure::unit`].
///
/// A `× 10^9/L` count is scaled to cells/μL. Other fractional values, and
/// values that do not fit a `u32`, are ignored.
#[must_use]
pub fn find_threshold(measure: LabMeasure, text: &str) -> Option<u32> {
    let caps = measure.regex().captures(text)?;
    let per_litre = caps.get(2).is_some();
    parse_value(caps.get(1)?.as_str(), per_litre)
}

/// Whole value of a matched number; `10^9/L` counts carry three decimal
/// places into cells/μL.
fn parse_value(number: &str, per_litre: bool) -> Option<u32> {
    let digits = number.replace(',', "");
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    let (places, scale) = if per_litre { (3, 1000) } else { (0, 1) };
    if fraction.len() > places {
        return None;
    }

    let whole: u32 = whole.parse().ok()?;
    let fraction: u32 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<places$}").parse().ok()?
    };
    whole.checked_mul(scale)?.checked_add(fraction)
}

/// Every tracked measure with a threshold in `text`, in [`LabMeasure::ALL`] order.
#[must_use]
pub fn scan_thresholds(text: &str) -> Vec<(LabMeasure, u32)> {
    LabMeasure::ALL
        .into_iter()
        .filter_map(|measure| find_threshold(measure, text).map(|value| (measure, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anc_threshold_drops_separators() {
        assert_eq!(
            find_threshold(
                LabMeasure::AbsoluteNeutrophilCount,
                "Absolute neutrophil count ≥1,500/μL"
            ),
            Some(1500)
        );
        assert_eq!(
            find_threshold(
                LabMeasure::AbsoluteNeutrophilCount,
                "absolute neutrophil count (ANC) >= 1000 cells/mm3"
            ),
            Some(1000)
        );
    }

    #[test]
    fn test_per_litre_counts_scale_to_microlitre() {
        let text = "Absolute neutrophil count ≥1.5 × 10^9/L and platelet count ≥ 100 x 10^9/L";
        assert_eq!(
            find_threshold(LabMeasure::AbsoluteNeutrophilCount, text),
            Some(1500)
        );
        assert_eq!(find_threshold(LabMeasure::PlateletCount, text), Some(100_000));
    }

    #[test]
    fn test_fraction_without_si_unit_is_ignored() {
        assert_eq!(
            find_threshold(LabMeasure::AbsoluteNeutrophilCount, "neutrophil count ≥ 1.5"),
            None
        );
        assert_eq!(
            find_threshold(LabMeasure::CreatinineClearance, "creatinine clearance ≥ 60.5 mL/min"),
            None
        );
        assert_eq!(
            find_threshold(LabMeasure::PlateletCount, "platelets ≥ 0.0125 × 10^9/L"),
            None
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "Creatinine clearance ≥ 60 mL/min; or creatinine clearance 45 with approval";
        assert_eq!(find_threshold(LabMeasure::CreatinineClearance, text), Some(60));
    }

    #[test]
    fn test_missing_number_yields_none() {
        assert_eq!(
            find_threshold(LabMeasure::CreatinineClearance, "adequate creatinine clearance"),
            None
        );
        assert_eq!(find_threshold(LabMeasure::PlateletCount, ""), None);
    }

    #[test]
    fn test_overflowing_value_is_ignored() {
        assert_eq!(
            find_threshold(LabMeasure::PlateletCount, "platelets ≥ 99999999999"),
            None
        );
    }

    #[test]
    fn test_scan_reports_in_measure_order() {
        let text = "Platelets ≥100,000/μL, neutrophil count ≥ 1,500 and creatinine clearance > 50";
        assert_eq!(
            scan_thresholds(text),
            vec![
                (LabMeasure::AbsoluteNeutrophilCount, 1500),
                (LabMeasure::CreatinineClearance, 50),
                (LabMeasure::PlateletCount, 100_000),
            ]
        );
    }
}
