//! Scenario replay binary for the Hoard storage index.
//!
//! Loads a YAML scenario, replays its operations against a fresh
//! `KeyCounter`, and logs every query result followed by a summary of the
//! final counter contents.
//!
//! # Usage
//!
//! ```text
//! hoard-replay [SCENARIO]
//! ```
//!
//! `SCENARIO` defaults to `hoard-replay.yaml`. A missing default file runs
//! the empty scenario; a missing explicit file is an error. Log verbosity is
//! controlled with `RUST_LOG` (default `info`).

mod config;
mod error;
mod scenario;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ScenarioConfig;
use crate::error::ReplayError;
use crate::scenario::Scenario;

const DEFAULT_SCENARIO: &str = "hoard-replay.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or names an unknown
/// resource.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("hoard-replay starting");

    let config = load_config(std::env::args().nth(1).map(PathBuf::from))?;
    info!(
        drop_zeros = config.counter.drop_zeros,
        items = config.registry.items.len(),
        fluids = config.registry.fluids.len(),
        ops = config.ops.len(),
        "scenario loaded"
    );

    let report = Scenario::load(config)?.run()?;
    for (key, amount) in &report.entries {
        info!(key = key.as_str(), amount, "final entry");
    }
    info!(
        queries = report.queries.len(),
        entries = report.len,
        ledgers = report.ledgers,
        "replay finished"
    );
    Ok(())
}

/// Load the scenario named on the command line, or the default one.
fn load_config(path: Option<PathBuf>) -> Result<ScenarioConfig, ReplayError> {
    if let Some(path) = path {
        return Ok(ScenarioConfig::from_file(&path)?);
    }
    let default = PathBuf::from(DEFAULT_SCENARIO);
    if default.exists() {
        Ok(ScenarioConfig::from_file(&default)?)
    } else {
        info!("scenario file not found, replaying nothing");
        Ok(ScenarioConfig::default())
    }
}
