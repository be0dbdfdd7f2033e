//! Strategy configuration payload for the selected pair.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::walkforward::{ParameterPair, WalkForwardResult};

use super::{write_atomic, ReportError};

pub const DEFAULT_STRATEGY_NAME: &str = "SmaCross";

/// Minimum bars a live strategy should see before trading:
/// `max(slow + 5, train_window / 10)`.
pub fn min_samples(slow_period: usize, train_window: usize) -> usize {
    (slow_period + 5).max(train_window / 10)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub symbol: String,
    pub fast_period: usize,
    pub slow_period: usize,
    pub min_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy_name: String,
    pub params: StrategyParams,
}

impl StrategyConfig {
    pub fn new(strategy_name: &str, symbol: &str, selection: ParameterPair, train_window: usize) -> Self {
        Self {
            strategy_name: strategy_name.to_string(),
            params: StrategyParams {
                symbol: symbol.to_string(),
                fast_period: selection.fast,
                slow_period: selection.slow,
                min_samples: min_samples(selection.slow, train_window),
            },
        }
    }

    /// Build from a finished walk-forward run.
    pub fn from_result(strategy_name: &str, symbol: &str, result: &WalkForwardResult) -> Self {
        Self::new(strategy_name, symbol, result.selection, result.train_window)
    }

    pub fn to_toml(&self) -> Result<String, ReportError> {
        Ok(toml::to_string(self)?)
    }

    /// Write as TOML.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        write_atomic(path, self.to_toml()?.as_bytes())?;
        info!("Strategy config written to {}", path.display());
        Ok(())
    }
}
