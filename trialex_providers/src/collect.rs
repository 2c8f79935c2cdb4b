use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};
use trialex_core::{TrialRecord, TrialSource};

/// Run each query in turn and fetch the trials it finds.
///
/// Trials already seen in an earlier query are not fetched again. Failed
/// searches and fetches are logged and skipped, as are trials without
/// eligibility text. `delay` is waited after every fetch. Collection stops
/// once `max_total` trials are gathered.
pub async fn collect_trials<S: AsRef<str>>(
    source: &dyn TrialSource,
    queries: &[S],
    per_query: usize,
    max_total: usize,
    delay: Duration,
) -> Vec<TrialRecord> {
    let mut trials = Vec::new();
    let mut seen = HashSet::new();

    for query in queries {
        if trials.len() >= max_total {
            break;
        }
        let query = query.as_ref();
        info!("Searching: {query}");

        let nct_ids = match source.search(query, per_query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Search '{query}' failed: {e}");
                continue;
            }
        };
        if nct_ids.is_empty() {
            info!("No trials found for '{query}'");
            continue;
        }

        for nct_id in nct_ids {
            if trials.len() >= max_total {
                break;
            }
            if !seen.insert(nct_id.clone()) {
                continue;
            }

            match source.fetch(&nct_id).await {
                Ok(trial) if trial.has_criteria() => {
                    info!("Fetched {nct_id}: {}", trial.title);
                    trials.push(trial);
                }
                Ok(_) => info!("Skipping {nct_id}: no eligibility criteria"),
                Err(e) => warn!("Failed to fetch {nct_id}: {e}"),
            }

            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }

    info!("Collected {} trials", trials.len());
    trials
}
