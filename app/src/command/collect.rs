use std::path::PathBuf;

use tracing::{info, warn};
use trialex_config::Config;
use trialex_providers::{ClinicalTrialsClient, collect_trials};

use super::write_json;

/// Input for the collect strategy.
#[derive(Debug, Clone, Default)]
pub struct CollectInput {
    /// Overrides `registry.max_total`
    pub max_total: Option<usize>,
    /// Overrides `output.raw_trials`
    pub output: Option<PathBuf>,
}

/// Strategy for pulling trials from ClinicalTrials.gov.
///
/// Runs every configured query, keeps trials that carry eligibility text
/// and writes them as a JSON array.
#[derive(Debug, Clone, Copy)]
pub struct CollectStrategy;

impl super::CommandStrategy for CollectStrategy {
    type Input = CollectInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let registry = &config.registry;
        let max_total = input.max_total.unwrap_or(registry.max_total);
        let output = input.output.unwrap_or_else(|| config.output.raw_trials.clone());

        let client = ClinicalTrialsClient::new(&registry.base_url, registry.timeout())?
            .with_retry_delays(registry.retry_delays());

        info!(
            "Collecting up to {max_total} trials from {} queries",
            registry.queries.len()
        );
        let trials = collect_trials(
            &client,
            &registry.queries,
            registry.page_size,
            max_total,
            registry.request_delay(),
        )
        .await;

        if trials.is_empty() {
            warn!("No trials collected");
        }
        write_json(&output, &trials)?;
        println!("Collected {} trials -> {}", trials.len(), output.display());
        Ok(())
    }
}
