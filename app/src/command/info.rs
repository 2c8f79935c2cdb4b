use trialex_config::Config;
use trialex_core::util::ellipsize;
use trialex_extraction::EntityMatcher;

/// Strategy for displaying configuration information.
///
/// Prints the registry search plan, the summarizer settings with the API
/// key masked, the pattern table size per category and the output paths.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== trialex Configuration ===\n");

        let registry = &config.registry;
        println!("Registry:");
        println!("  Base URL: {}", registry.base_url);
        println!("  Timeout: {}s", registry.timeout_secs);
        println!("  Request Delay: {}ms", registry.request_delay_ms);
        println!("  Retry Delays: {:?}ms", registry.retry_delays_ms);
        println!("  Page Size: {}", registry.page_size);
        println!("  Max Total: {}", registry.max_total);
        println!("  Queries ({}):", registry.queries.len());
        for query in &registry.queries {
            println!("    - {}", ellipsize(query, 60));
        }
        println!();

        let summarizer = &config.summarizer;
        println!("Summarizer:");
        println!("  Enabled: {}", summarizer.enabled);
        println!("  Base URL: {}", summarizer.base_url);
        if summarizer.api_key.is_empty() {
            println!("  API Key: (not set)");
        } else {
            println!("  API Key: {}", summarizer.masked_api_key());
        }
        println!("  Model: {}", summarizer.model);
        println!("  Max Output Tokens: {}", summarizer.max_output_tokens);
        println!("  Retry Delays: {:?}ms", summarizer.retry_delays_ms);
        println!(
            "  Input Chars: {}..{}",
            summarizer.limits.min_input_chars, summarizer.limits.max_input_chars
        );
        println!("  Fallback Chars: {}", summarizer.limits.fallback_chars);
        println!();

        println!("Extraction Patterns:");
        match EntityMatcher::new(&config.extraction) {
            Ok(matcher) => {
                for (category, count) in matcher.category_counts() {
                    println!("  {category}: {count}");
                }
                println!(
                    "  Custom: {}",
                    config.extraction.extra_patterns.len()
                );
            }
            Err(e) => println!("  Invalid: {e}"),
        }
        println!();

        println!("Output:");
        println!("  Raw Trials: {}", config.output.raw_trials.display());
        println!(
            "  Processed Trials: {}",
            config.output.processed_trials.display()
        );
        println!(
            "  Extraction Results: {}",
            config.output.extraction_results.display()
        );

        Ok(())
    }
}
