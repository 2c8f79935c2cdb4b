//! Short human-readable summaries of criteria segments.

use serde::{Deserialize, Serialize};
use tracing::warn;
use trialex_core::Summarizer;
use trialex_core::util::{char_count, truncate_chars};

/// Length bounds for criteria summaries, all in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Text shorter than this is already a summary and is returned as is.
    #[serde(default = "SummarySettings::default_min_input_chars")]
    pub min_input_chars: usize,

    /// Only this much of the text is handed to the summarizer.
    #[serde(default = "SummarySettings::default_max_input_chars")]
    pub max_input_chars: usize,

    /// Length of the truncated fallback summary.
    #[serde(default = "SummarySettings::default_fallback_chars")]
    pub fallback_chars: usize,
}

impl SummarySettings {
    const fn default_min_input_chars() -> usize {
        100
    }

    const fn default_max_input_chars() -> usize {
        1000
    }

    const fn default_fallback_chars() -> usize {
        100
    }

    /// Truncated stand-in used when no model summary is available.
    #[must_use]
    pub fn fallback(&self, text: &str) -> String {
        format!("{}...", truncate_chars(text, self.fallback_chars))
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            min_input_chars: Self::default_min_input_chars(),
            max_input_chars: Self::default_max_input_chars(),
            fallback_chars: Self::default_fallback_chars(),
        }
    }
}

/// Summarize one criteria segment.
///
/// Empty text gives an empty summary and short text is returned unchanged.
/// Without a summarizer, or when it fails or answers with nothing, the
/// result is the first `fallback_chars` characters followed by `...`.
pub async fn summarize_criteria(
    summarizer: Option<&dyn Summarizer>,
    text: &str,
    settings: &SummarySettings,
) -> String {
    if text.is_empty() {
        return String::new();
    }
    if char_count(text) < settings.min_input_chars {
        return text.to_string();
    }

    let Some(summarizer) = summarizer else {
        return settings.fallback(text);
    };

    let input = truncate_chars(text, settings.max_input_chars);
    match summarizer.summarize(input).await {
        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        Ok(_) => {
            warn!("Summarizer returned an empty summary, using truncated text");
            settings.fallback(text)
        }
        Err(e) => {
            warn!("Summarization failed: {e}");
            settings.fallback(text)
        }
    }
}
