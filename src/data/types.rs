//! Core data types for price series.
//!
//! A `PriceSeries` is the only market input of the walk-forward engine:
//! an ordered run of closing prices, optionally keyed by timestamp.

use std::fmt;
use std::ops::Range;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::loader::LoaderError;

/// Key identifying one observation in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexKey {
    /// Implicit integer position (no timestamp column).
    Position(usize),
    /// Bar timestamp.
    Timestamp(NaiveDateTime),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(pos) => write!(f, "{}", pos),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// Ordered series of closing prices.
///
/// Invariants enforced at construction:
/// - at least one price
/// - when timestamps are present, one per price and strictly increasing
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
    timestamps: Option<Vec<NaiveDateTime>>,
}

impl PriceSeries {
    /// Create a series indexed by position.
    pub fn new(closes: Vec<f64>) -> Result<Self, LoaderError> {
        if closes.is_empty() {
            return Err(LoaderError::InvalidData("price series is empty".to_string()));
        }
        Ok(Self {
            closes,
            timestamps: None,
        })
    }

    /// Create a series indexed by timestamp.
    pub fn with_timestamps(
        closes: Vec<f64>,
        timestamps: Vec<NaiveDateTime>,
    ) -> Result<Self, LoaderError> {
        if closes.is_empty() {
            return Err(LoaderError::InvalidData("price series is empty".to_string()));
        }
        if closes.len() != timestamps.len() {
            return Err(LoaderError::InvalidData(format!(
                "{} prices but {} timestamps",
                closes.len(),
                timestamps.len()
            )));
        }
        if let Some(pos) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(LoaderError::InvalidData(format!(
                "timestamps not strictly increasing at row {}: {} then {}",
                pos + 1,
                timestamps[pos],
                timestamps[pos + 1]
            )));
        }
        Ok(Self {
            closes,
            timestamps: Some(timestamps),
        })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Whether the series holds no prices.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// All closing prices in order.
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Closing prices for a half-open position range.
    pub fn slice(&self, range: Range<usize>) -> &[f64] {
        &self.closes[range]
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps.is_some()
    }

    /// Index key of the observation at `pos`.
    pub fn key_at(&self, pos: usize) -> IndexKey {
        match &self.timestamps {
            Some(ts) => IndexKey::Timestamp(ts[pos]),
            None => IndexKey::Position(pos),
        }
    }
}
