//! Output artifacts of a walk-forward run.
//!
//! - Per-window summary table (CSV or JSON)
//! - Strategy configuration payload (TOML)
//!
//! Artifacts are staged in a temporary sibling file and renamed into place.

pub mod strategy;
pub mod summary;

use std::fs;
use std::path::Path;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use strategy::{min_samples, StrategyConfig, StrategyParams, DEFAULT_STRATEGY_NAME};
pub use summary::{summary_dataframe, summary_rows, write_summary, SummaryRow};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, contents)?;
    fs::rename(&staging, path)?;
    Ok(())
}
