//! Run configuration.
//!
//! Loaded from TOML; any field left out takes its default. The command
//! line overrides individual fields after loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::DEFAULT_STRATEGY_NAME;
use crate::walkforward::{ParameterGrid, WalkForwardError, WalkForwardOptimizer};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },
}

/// Walk-forward optimization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Symbol written into the strategy config.
    pub symbol: String,

    /// Strategy name written into the strategy config.
    pub strategy_name: String,

    /// Training window length in bars.
    pub train_window: usize,

    /// Test window length in bars; also the roll step.
    pub test_window: usize,

    /// Candidate fast periods.
    pub fast_values: Vec<usize>,

    /// Candidate slow periods.
    pub slow_values: Vec<usize>,

    /// Optional per-window summary output (.csv or .json).
    pub summary_output: Option<PathBuf>,

    /// Strategy config output.
    pub config_output: PathBuf,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        let grid = ParameterGrid::default();
        Self {
            symbol: "BTCUSDT".to_string(),
            strategy_name: DEFAULT_STRATEGY_NAME.to_string(),
            train_window: 200,
            test_window: 50,
            fast_values: grid.fast_values,
            slow_values: grid.slow_values,
            summary_output: None,
            config_output: PathBuf::from("strategies/sma_walk_forward.toml"),
        }
    }
}

impl OptimizeConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Validated parameter grid.
    pub fn grid(&self) -> Result<ParameterGrid, WalkForwardError> {
        ParameterGrid::new(self.fast_values.clone(), self.slow_values.clone())
    }

    /// Optimizer for these settings.
    pub fn optimizer(&self) -> Result<WalkForwardOptimizer, WalkForwardError> {
        Ok(WalkForwardOptimizer::new(self.train_window, self.test_window).with_param_grid(self.grid()?))
    }
}

/// Parse a comma-separated list of positive periods, e.g. `"5,10,15"`.
///
/// Blank entries are ignored; at least one value is required.
pub fn parse_range(input: &str) -> Result<Vec<usize>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidRange {
        input: input.to_string(),
        reason,
    };

    let values = input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<usize>() {
            Ok(0) => Err(invalid("periods must be positive".to_string())),
            Ok(v) => Ok(v),
            Err(e) => Err(invalid(format!("'{}': {}", part, e))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(invalid("at least one value must be provided".to_string()));
    }
    Ok(values)
}
