//! Pipeline steps over whole trial records.
//!
//! Splitting, tokenizing and matching are pure and fan out over rayon.
//! Summaries may call a remote model and run one trial at a time.

use rayon::prelude::*;
use tracing::{debug, info};
use trialex_core::{ExtractionRecord, ProcessedTrial, SegmentEntities, Summarizer, TrialRecord};

use crate::matcher::engine::EntityMatcher;
use crate::splitter::split_criteria;
use crate::summary::{SummarySettings, summarize_criteria};
use crate::tokenizer::tokenize_items;

/// Split a trial's criteria and itemize both sections.
#[must_use]
pub fn preprocess_trial(trial: TrialRecord) -> ProcessedTrial {
    let split = split_criteria(&trial.criteria_text);
    let inclusion_items = tokenize_items(&split.inclusion);
    let exclusion_items = tokenize_items(&split.exclusion);

    debug!(
        "{}: {} inclusion / {} exclusion items",
        trial.nct_id,
        inclusion_items.len(),
        exclusion_items.len()
    );

    ProcessedTrial {
        trial,
        num_inclusion: inclusion_items.len(),
        num_exclusion: exclusion_items.len(),
        inclusion_criteria: split.inclusion,
        exclusion_criteria: split.exclusion,
        inclusion_items,
        exclusion_items,
    }
}

/// Preprocess every trial in parallel, keeping input order.
#[must_use]
pub fn preprocess_all(trials: Vec<TrialRecord>) -> Vec<ProcessedTrial> {
    let processed: Vec<_> = trials.into_par_iter().map(preprocess_trial).collect();
    info!("Preprocessed {} trials", processed.len());
    processed
}

/// Match both segments of a trial independently.
#[must_use]
pub fn extract_segments(trial: &ProcessedTrial, matcher: &EntityMatcher) -> SegmentEntities {
    SegmentEntities {
        inclusion: matcher.extract(&trial.inclusion_criteria),
        exclusion: matcher.extract(&trial.exclusion_criteria),
    }
}

/// [`extract_segments`] for every trial in parallel, keeping input order.
#[must_use]
pub fn extract_all(trials: &[ProcessedTrial], matcher: &EntityMatcher) -> Vec<SegmentEntities> {
    trials
        .par_iter()
        .map(|trial| extract_segments(trial, matcher))
        .collect()
}

/// Assemble the output record of one trial.
pub async fn build_record(
    trial: &ProcessedTrial,
    entities: SegmentEntities,
    summarizer: Option<&dyn Summarizer>,
    settings: &SummarySettings,
) -> ExtractionRecord {
    let inclusion_summary =
        summarize_criteria(summarizer, &trial.inclusion_criteria, settings).await;
    let exclusion_summary =
        summarize_criteria(summarizer, &trial.exclusion_criteria, settings).await;
    let entity_counts = entities.counts();

    ExtractionRecord {
        nct_id: trial.trial.nct_id.clone(),
        title: trial.trial.title.clone(),
        condition: trial.trial.condition.clone(),
        phase: trial.trial.phase.clone(),
        inclusion_entities: entities.inclusion,
        exclusion_entities: entities.exclusion,
        inclusion_summary,
        exclusion_summary,
        entity_counts,
    }
}

/// Extract entities for all trials, then summarize and assemble records.
pub async fn build_records(
    trials: &[ProcessedTrial],
    matcher: &EntityMatcher,
    summarizer: Option<&dyn Summarizer>,
    settings: &SummarySettings,
) -> Vec<ExtractionRecord> {
    let all_entities = extract_all(trials, matcher);
    let total = trials.len();
    let mut records = Vec::with_capacity(total);

    for (idx, (trial, entities)) in trials.iter().zip(all_entities).enumerate() {
        let record = build_record(trial, entities, summarizer, settings).await;
        info!(
            "[{}/{total}] {} -> {} entities",
            idx + 1,
            record.nct_id,
            record.entity_counts.total()
        );
        records.push(record);
    }

    records
}
