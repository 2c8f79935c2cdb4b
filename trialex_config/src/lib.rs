//! Configuration file for the `trialex` binary, stored as JSON under
//! `~/trialex/config.json`. Every field has a default, so a partial file
//! (or none at all) is valid.

mod schema;

pub use schema::{Config, OutputConfig, RegistryConfig, SummarizerConfig};
