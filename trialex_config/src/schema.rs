use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use trialex_extraction::{ExtractionConfig, SummarySettings};

const CONFIG_DIR: &str = "trialex";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// ClinicalTrials.gov access and the search plan.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default = "RegistryConfig::default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "RegistryConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause after every trial fetch (milliseconds)
    #[serde(default = "RegistryConfig::default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Pauses between retries of a failed request (milliseconds)
    #[serde(default = "RegistryConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,

    /// Trial ids requested per search
    #[serde(default = "RegistryConfig::default_page_size")]
    pub page_size: usize,

    /// Stop collecting after this many trials with criteria
    #[serde(default = "RegistryConfig::default_max_total")]
    pub max_total: usize,

    #[serde(default = "RegistryConfig::default_queries")]
    pub queries: Vec<String>,
}

impl RegistryConfig {
    fn default_base_url() -> String {
        "https://clinicaltrials.gov/api/v2/studies".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }

    const fn default_request_delay_ms() -> u64 {
        500
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![1000, 2000, 4000]
    }

    const fn default_page_size() -> usize {
        15
    }

    const fn default_max_total() -> usize {
        40
    }

    fn default_queries() -> Vec<String> {
        [
            "immunotherapy lung cancer",
            "immunotherapy melanoma",
            "checkpoint inhibitor NSCLC",
            "PD-1 therapy breast cancer",
            "targeted therapy breast cancer",
            "targeted therapy lung cancer",
            "HER2 targeted therapy",
            "EGFR inhibitor lung cancer",
            "chemotherapy advanced breast cancer",
            "hormone therapy metastatic breast cancer",
            "combination therapy melanoma",
            "metastatic colorectal cancer treatment",
            "advanced renal cell carcinoma therapy",
            "recurrent ovarian cancer treatment",
            "triple negative breast cancer treatment",
            "BRAF mutant melanoma",
            "MSI-high colorectal cancer",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            request_delay_ms: Self::default_request_delay_ms(),
            retry_delays_ms: Self::default_retry_delays_ms(),
            page_size: Self::default_page_size(),
            max_total: Self::default_max_total(),
            queries: Self::default_queries(),
        }
    }
}

/// Optional chat-completion model for criteria summaries.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SummarizerConfig {
    /// Without a model, summaries are the truncated criteria text
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "SummarizerConfig::default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "SummarizerConfig::default_model")]
    pub model: String,

    #[serde(default = "SummarizerConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "SummarizerConfig::default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Pauses between retries of a failed model call (milliseconds)
    #[serde(default = "SummarizerConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,

    #[serde(flatten)]
    pub limits: SummarySettings,
}

impl SummarizerConfig {
    fn default_base_url() -> String {
        "https://open.bigmodel.cn/api/paas/v4".to_string()
    }

    fn default_model() -> String {
        "glm-4-flash".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }

    const fn default_max_output_tokens() -> u32 {
        60
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![1000, 2000]
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    /// The API key with all but its last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let count = self.api_key.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = self.api_key.chars().skip(count - 4).collect();
        format!("{}{tail}", "*".repeat(count - 4))
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: Self::default_base_url(),
            api_key: String::new(),
            model: Self::default_model(),
            timeout_secs: Self::default_timeout_secs(),
            max_output_tokens: Self::default_max_output_tokens(),
            retry_delays_ms: Self::default_retry_delays_ms(),
            limits: SummarySettings::default(),
        }
    }
}

/// Where each stage reads and writes its JSON.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_raw_trials")]
    pub raw_trials: PathBuf,

    #[serde(default = "OutputConfig::default_processed_trials")]
    pub processed_trials: PathBuf,

    #[serde(default = "OutputConfig::default_extraction_results")]
    pub extraction_results: PathBuf,
}

impl OutputConfig {
    fn default_raw_trials() -> PathBuf {
        PathBuf::from("data/raw/api_trials.json")
    }

    fn default_processed_trials() -> PathBuf {
        PathBuf::from("data/processed/processed_trials.json")
    }

    fn default_extraction_results() -> PathBuf {
        PathBuf::from("results/extraction_results.json")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_trials: Self::default_raw_trials(),
            processed_trials: Self::default_processed_trials(),
            extraction_results: Self::default_extraction_results(),
        }
    }
}

impl Config {
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);
        Ok(config_dir.join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'trialex init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;
        Ok(config)
    }

    /// [`Config::load`], or the built-in defaults when there is no usable
    /// config file.
    #[must_use]
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::info!("Using default configuration: {e}");
            Self::default()
        })
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write the default configuration and return its path.
    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        Self::write_template(&config_path)?;
        Ok(config_path)
    }

    fn write_template(path: &Path) -> anyhow::Result<()> {
        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, template)?;
        Ok(())
    }
}
