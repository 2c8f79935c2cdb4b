use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use trialex_core::trial::NOT_AVAILABLE;
use trialex_core::{TrialRecord, TrialSource};
use url::Url;

use crate::retry::retry_with_backoff;

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2/studies";

/// Client for the ClinicalTrials.gov v2 studies API.
///
/// Search returns NCT identifiers only; full records come from a second
/// request per trial.
pub struct ClinicalTrialsClient {
    client: Client,
    base_url: String,
    retry_delays: Vec<Duration>,
}

impl ClinicalTrialsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trialex/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Creating ClinicalTrialsClient for {base_url}");

        Ok(Self {
            client,
            base_url,
            retry_delays: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_retry_delays(mut self, retry_delays: Vec<Duration>) -> Self {
        self.retry_delays = retry_delays;
        self
    }

    fn search_url(&self, query: &str, max_results: usize) -> anyhow::Result<Url> {
        let page_size = max_results.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("query.cond", query),
                ("pageSize", page_size.as_str()),
                ("format", "json"),
            ],
        )
        .with_context(|| format!("Invalid registry URL: {}", self.base_url))
    }

    fn study_url(&self, nct_id: &str) -> anyhow::Result<Url> {
        Url::parse(&format!("{}/{nct_id}", self.base_url))
            .with_context(|| format!("Invalid study URL for {nct_id}"))
    }

    /// Helper method to send a single request
    async fn try_get(&self, url: &Url) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }

    async fn get_json(&self, url: &Url) -> anyhow::Result<Value> {
        debug!("GET {url}");
        retry_with_backoff(|| self.try_get(url), &self.retry_delays).await
    }
}

#[async_trait]
impl TrialSource for ClinicalTrialsClient {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<String>> {
        let url = self.search_url(query, max_results)?;
        let response = self.get_json(&url).await?;
        let nct_ids = nct_ids_from_search(&response);
        info!("Search '{query}' found {} trials", nct_ids.len());
        Ok(nct_ids)
    }

    async fn fetch(&self, nct_id: &str) -> anyhow::Result<TrialRecord> {
        let url = self.study_url(nct_id)?;
        let study = self.get_json(&url).await?;
        trial_from_json(nct_id, &study)
    }
}

/// NCT identifiers of a search response, skipping studies without one.
#[must_use]
pub fn nct_ids_from_search(response: &Value) -> Vec<String> {
    let Some(studies) = response.get("studies").and_then(Value::as_array) else {
        warn!("No 'studies' key in search response");
        return Vec::new();
    };

    studies
        .iter()
        .filter_map(|study| {
            study
                .pointer("/protocolSection/identificationModule/nctId")
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .collect()
}

/// Build a [`TrialRecord`] from a study document.
///
/// Every optional field falls back to the record default: `N/A` for text,
/// 0 enrollment, empty criteria, sex `ALL`, no healthy volunteers.
///
/// # Errors
/// Returns an error if the document has no protocol or identification
/// section.
pub fn trial_from_json(nct_id: &str, study: &Value) -> anyhow::Result<TrialRecord> {
    let protocol = study
        .get("protocolSection")
        .ok_or_else(|| anyhow!("{nct_id}: missing protocolSection"))?;
    let identification = protocol
        .get("identificationModule")
        .ok_or_else(|| anyhow!("{nct_id}: missing identificationModule"))?;
    let eligibility = &protocol["eligibilityModule"];
    let design = &protocol["designModule"];

    let mut record = TrialRecord::new(nct_id);

    if let Some(title) = identification["briefTitle"].as_str() {
        record.title = title.to_string();
    }
    record.condition = join_or_na(&protocol["conditionsModule"]["conditions"]);
    record.phase = join_or_na(&design["phases"]);
    record.enrollment = design["enrollmentInfo"]["count"].as_u64().unwrap_or(0);
    record.criteria_text = eligibility["eligibilityCriteria"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    if let Some(min_age) = eligibility["minimumAge"].as_str() {
        record.min_age = min_age.to_string();
    }
    if let Some(max_age) = eligibility["maximumAge"].as_str() {
        record.max_age = max_age.to_string();
    }
    if let Some(sex) = eligibility["sex"].as_str() {
        record.sex = sex.to_string();
    }
    record.healthy_volunteers = eligibility["healthyVolunteers"].as_bool().unwrap_or(false);

    Ok(record)
}

fn join_or_na(list: &Value) -> String {
    let items: Vec<&str> = list
        .as_array()
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nct_ids_from_search() {
        let response = json!({
            "studies": [
                {"protocolSection": {"identificationModule": {"nctId": "NCT01"}}},
                {"protocolSection": {}},
                {"protocolSection": {"identificationModule": {"nctId": "NCT02"}}}
            ]
        });
        assert_eq!(nct_ids_from_search(&response), vec!["NCT01", "NCT02"]);
        assert!(nct_ids_from_search(&json!({"totalCount": 0})).is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_trial_from_full_document() {
        let study = json!({
            "protocolSection": {
                "identificationModule": {"nctId": "NCT03", "briefTitle": "A Phase 3 Study"},
                "conditionsModule": {"conditions": ["NSCLC", "Lung Cancer"]},
                "designModule": {"phases": ["PHASE2", "PHASE3"], "enrollmentInfo": {"count": 420}},
                "eligibilityModule": {
                    "eligibilityCriteria": "Inclusion Criteria:\n* Adults",
                    "minimumAge": "18 Years",
                    "sex": "FEMALE",
                    "healthyVolunteers": false
                }
            }
        });

        let record = trial_from_json("NCT03", &study).expect("document should parse");
        assert_eq!(record.title, "A Phase 3 Study");
        assert_eq!(record.condition, "NSCLC, Lung Cancer");
        assert_eq!(record.phase, "PHASE2, PHASE3");
        assert_eq!(record.enrollment, 420);
        assert_eq!(record.criteria_text, "Inclusion Criteria:\n* Adults");
        assert_eq!(record.min_age, "18 Years");
        assert_eq!(record.max_age, NOT_AVAILABLE);
        assert_eq!(record.sex, "FEMALE");
        assert_eq!(record.data_source, "api");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_trial_from_sparse_document_uses_defaults() {
        let study = json!({
            "protocolSection": {
                "identificationModule": {"nctId": "NCT04"},
                "conditionsModule": {"conditions": []},
                "eligibilityModule": {"eligibilityCriteria": 42}
            }
        });

        let record = trial_from_json("NCT04", &study).expect("document should parse");
        assert_eq!(record, TrialRecord::new("NCT04"));
        assert!(!record.has_criteria());
    }

    #[test]
    fn test_trial_without_protocol_is_an_error() {
        assert!(trial_from_json("NCT05", &json!({"derivedSection": {}})).is_err());
        assert!(trial_from_json("NCT05", &json!({"protocolSection": {}})).is_err());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_request_urls() {
        let client = ClinicalTrialsClient::new(format!("{DEFAULT_BASE_URL}/"), Duration::from_secs(5))
            .expect("client should build");

        let search = client
            .search_url("PD-1 therapy breast cancer", 15)
            .expect("valid URL");
        assert_eq!(
            search.as_str(),
            "https://clinicaltrials.gov/api/v2/studies?query.cond=PD-1+therapy+breast+cancer&pageSize=15&format=json"
        );

        let study = client.study_url("NCT01234567").expect("valid URL");
        assert_eq!(
            study.as_str(),
            "https://clinicaltrials.gov/api/v2/studies/NCT01234567"
        );
    }
}
