//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`. The pipeline commands exchange JSON files whose
//! default locations come from the `output` section of the config.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

mod collect;
mod extract;
mod info;
mod init;
mod inspect;
mod preprocess;
mod version;

pub use collect::{CollectInput, CollectStrategy};
pub use extract::{ExtractInput, ExtractStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use inspect::{InspectInput, InspectStrategy};
pub use preprocess::{PreprocessInput, PreprocessStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// parameters are passed without boxing or runtime casting.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Read a JSON document produced by an earlier stage.
fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Pretty-print `value` to `path`, creating parent directories.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialex_core::TrialRecord;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_write_then_read_creates_directories() {
        let dir = std::env::temp_dir().join(format!("trialex-app-{}", std::process::id()));
        let path = dir.join("nested").join("trials.json");
        let trials = vec![TrialRecord::new("NCT01").with_criteria("Adults")];

        write_json(&path, &trials).expect("trials should be written");
        let back: Vec<TrialRecord> = read_json(&path).expect("trials should load");
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(back, trials);
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let path = Path::new("/nonexistent/trialex/trials.json");
        let result: anyhow::Result<Vec<TrialRecord>> = read_json(path);
        assert!(result.is_err_and(|e| e.to_string().contains("trials.json")));
    }
}
