use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use trialex_config::{Config, SummarizerConfig};
use trialex_core::util::ellipsize;
use trialex_core::{ProcessedTrial, Summarizer};
use trialex_extraction::{EntityMatcher, ExtractionStats, build_records};
use trialex_providers::ChatSummarizer;

use super::{read_json, write_json};

const PHRASE_WIDTH: usize = 40;

/// Input for the extract strategy.
#[derive(Debug, Clone, Default)]
pub struct ExtractInput {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Strategy for entity extraction over preprocessed trials.
///
/// Writes one record per trial and prints corpus statistics.
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let source = input
            .input
            .unwrap_or_else(|| config.output.processed_trials.clone());
        let output = input
            .output
            .unwrap_or_else(|| config.output.extraction_results.clone());

        let trials: Vec<ProcessedTrial> = read_json(&source)?;
        info!("Loaded {} processed trials from {}", trials.len(), source.display());

        let matcher =
            EntityMatcher::new(&config.extraction).context("Invalid extraction patterns")?;
        info!("Entity matcher ready with {} patterns", matcher.len());

        let summarizer = build_summarizer(&config)?;
        let summarizer_ref = summarizer.as_ref().map(|s| s as &dyn Summarizer);

        let records =
            build_records(&trials, &matcher, summarizer_ref, &config.summarizer.limits).await;
        write_json(&output, &records)?;

        let stats = ExtractionStats::from_records(&records)
            .with_lab_thresholds(trials.iter().map(ProcessedTrial::combined_criteria));
        print_stats(&stats);
        println!("\nResults -> {}", output.display());
        Ok(())
    }
}

fn build_summarizer(config: &Config) -> anyhow::Result<Option<ChatSummarizer>> {
    let settings: &SummarizerConfig = &config.summarizer;
    if !settings.enabled {
        info!("Summarizer disabled, using truncated criteria");
        return Ok(None);
    }
    if settings.api_key.is_empty() {
        warn!("Summarizer enabled without an API key, using truncated criteria");
        return Ok(None);
    }

    let summarizer = ChatSummarizer::new(
        &settings.base_url,
        &settings.api_key,
        &settings.model,
        settings.timeout(),
    )?
    .with_max_output_tokens(settings.max_output_tokens)
    .with_retry_delays(settings.retry_delays());

    info!("Summarizing with model={}", settings.model);
    Ok(Some(summarizer))
}

fn print_stats(stats: &ExtractionStats) {
    println!("=== Extraction Summary ===\n");
    println!("Trials: {}", stats.trials);
    println!("Inclusion entities: {}", stats.inclusion_entities);
    println!("Exclusion entities: {}", stats.exclusion_entities);
    println!("Average per trial: {:.1}", stats.average_per_trial);

    println!("\nInclusion entities by category:");
    for (category, count) in &stats.category_counts {
        println!("  {category:<10} {count}");
    }

    println!("\nTop inclusion entities:");
    for entry in &stats.top_entities {
        println!(
            "  {:<width$} {}",
            ellipsize(&entry.phrase, PHRASE_WIDTH),
            entry.count,
            width = PHRASE_WIDTH + 3
        );
    }

    println!("\nBiomarker landscape:");
    for entry in &stats.biomarker_landscape {
        println!(
            "  {:<width$} {:<4} {:?}",
            ellipsize(&entry.phrase, PHRASE_WIDTH),
            entry.count,
            entry.class,
            width = PHRASE_WIDTH + 3
        );
    }

    println!("\nTreatment classes (distinct drugs):");
    for (class, count) in &stats.treatment_classes {
        println!("  {class:?}: {count}");
    }

    println!("\nLab thresholds:");
    for (measure, histogram) in &stats.lab_thresholds {
        let values: Vec<String> = histogram
            .iter()
            .map(|(value, trials)| format!("{value} ({trials})"))
            .collect();
        println!("  {measure} ({}): {}", measure.unit(), values.join(", "));
    }
}
