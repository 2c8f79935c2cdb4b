use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use trialex_config::Config;
use trialex_core::EntityMap;
use trialex_extraction::{
    EntityMatcher, LabMeasure, scan_thresholds, split_criteria, tokenize_items,
};

/// Input for the inspect strategy.
#[derive(Debug, Clone, Default)]
pub struct InspectInput {
    /// Criteria text file; stdin when `None`
    pub file: Option<PathBuf>,
}

/// Strategy for auditing the extraction of a single criteria text.
#[derive(Debug, Clone, Copy)]
pub struct InspectStrategy;

#[derive(Debug, Serialize)]
struct Inspection {
    inclusion_criteria: String,
    exclusion_criteria: String,
    inclusion_items: Vec<String>,
    exclusion_items: Vec<String>,
    inclusion_entities: EntityMap,
    exclusion_entities: EntityMap,
    lab_thresholds: Vec<(LabMeasure, u32)>,
}

impl Inspection {
    fn run(text: &str, matcher: &EntityMatcher) -> Self {
        let split = split_criteria(text);
        Self {
            inclusion_items: tokenize_items(&split.inclusion),
            exclusion_items: tokenize_items(&split.exclusion),
            inclusion_entities: matcher.extract(&split.inclusion),
            exclusion_entities: matcher.extract(&split.exclusion),
            lab_thresholds: scan_thresholds(text),
            inclusion_criteria: split.inclusion,
            exclusion_criteria: split.exclusion,
        }
    }
}

impl super::CommandStrategy for InspectStrategy {
    type Input = InspectInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let text = match &input.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read criteria from stdin")?;
                buffer
            }
        };

        let config = Config::load_or_default();
        let matcher =
            EntityMatcher::new(&config.extraction).context("Invalid extraction patterns")?;

        let inspection = Inspection::run(&text, &matcher);
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        Ok(())
    }
}
