use trialex_config::Config;

/// Strategy for initializing the configuration.
///
/// Writes the default configuration to `~/trialex/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config()?;
        println!("Config created at: {}", path.display());
        println!("\nNext steps:");
        println!("  1. Adjust the registry queries in the config if needed");
        println!("  2. Set summarizer.api_key and summarizer.enabled for model summaries");
        println!("  3. Run: trialex collect && trialex preprocess && trialex extract");
        Ok(())
    }
}
