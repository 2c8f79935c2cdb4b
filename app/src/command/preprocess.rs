use std::path::PathBuf;

use tracing::info;
use trialex_config::Config;
use trialex_core::TrialRecord;
use trialex_extraction::preprocess_all;

use super::{read_json, write_json};

/// Input for the preprocess strategy.
#[derive(Debug, Clone, Default)]
pub struct PreprocessInput {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Strategy for splitting collected criteria into sections and items.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessStrategy;

impl super::CommandStrategy for PreprocessStrategy {
    type Input = PreprocessInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let source = input.input.unwrap_or(config.output.raw_trials);
        let output = input.output.unwrap_or(config.output.processed_trials);

        let trials: Vec<TrialRecord> = read_json(&source)?;
        info!("Loaded {} trials from {}", trials.len(), source.display());

        let processed = preprocess_all(trials);

        if !processed.is_empty() {
            let count = processed.len() as f64;
            let inclusion: usize = processed.iter().map(|t| t.num_inclusion).sum();
            let exclusion: usize = processed.iter().map(|t| t.num_exclusion).sum();
            info!(
                "Average items per trial: {:.1} inclusion, {:.1} exclusion",
                inclusion as f64 / count,
                exclusion as f64 / count
            );
        }

        write_json(&output, &processed)?;
        println!("Preprocessed {} trials -> {}", processed.len(), output.display());
        Ok(())
    }
}
