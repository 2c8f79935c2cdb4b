use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;
use trialex_core::Summarizer;

use crate::retry::retry_with_backoff;

const SYSTEM_PROMPT: &str = "Summarize the clinical trial eligibility criteria you are given in \
     one or two plain sentences. Keep disease, biomarker and lab requirements. Do not add facts.";

/// Summarizer backed by an OpenAI-compatible chat completion endpoint.
pub struct ChatSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    retry_delays: Vec<Duration>,
}

impl ChatSummarizer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_output_tokens: 60,
            retry_delays: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    #[must_use]
    pub fn with_retry_delays(mut self, retry_delays: Vec<Duration>) -> Self {
        self.retry_delays = retry_delays;
        self
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": text},
            ],
            "max_tokens": self.max_output_tokens,
            "temperature": 0.0,
        })
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &Value) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        completion_content(&response)
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, text: &str) -> anyhow::Result<String> {
        let request = self.request_body(text);
        debug!("Summarizing {} chars with model={}", text.chars().count(), self.model);
        retry_with_backoff(|| self.try_send(&request), &self.retry_delays).await
    }
}

/// Message content of the first choice.
fn completion_content(response: &Value) -> anyhow::Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))
}
