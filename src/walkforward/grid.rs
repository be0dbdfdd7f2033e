//! Parameter grid and in-sample grid search.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::signal::{score, INVALID_SCORE};

use super::error::WalkForwardError;

/// A fast/slow moving-average period pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterPair {
    pub fast: usize,
    pub slow: usize,
}

impl ParameterPair {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }

    /// Only pairs with `fast < slow` are ever evaluated.
    pub fn is_valid(&self) -> bool {
        self.fast < self.slow
    }

    /// Score this pair on a close series.
    pub fn score(&self, closes: &[f64]) -> f64 {
        score(closes, self.fast, self.slow)
    }
}

impl fmt::Display for ParameterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fast={}, slow={}", self.fast, self.slow)
    }
}

/// Candidate fast and slow periods to sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGrid {
    /// Fast periods, outer loop, in the order supplied.
    pub fast_values: Vec<usize>,
    /// Slow periods, inner loop, in the order supplied.
    pub slow_values: Vec<usize>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            fast_values: vec![5, 10, 15, 20],
            slow_values: vec![20, 30, 40, 50],
        }
    }
}

impl ParameterGrid {
    /// Build a grid, rejecting empty value sets and zero periods.
    pub fn new(fast_values: Vec<usize>, slow_values: Vec<usize>) -> Result<Self, WalkForwardError> {
        validate_values("fast", &fast_values)?;
        validate_values("slow", &slow_values)?;
        Ok(Self {
            fast_values,
            slow_values,
        })
    }

    /// Size of the raw cross product, invalid pairs included.
    pub fn total_combinations(&self) -> usize {
        self.fast_values.len() * self.slow_values.len()
    }

    /// Valid pairs in canonical order: fast outer, slow inner.
    pub fn combinations(&self) -> Vec<ParameterPair> {
        candidate_pairs(&self.fast_values, &self.slow_values)
    }

    /// True when no cross-product pair has `fast < slow`.
    pub fn is_degenerate(&self) -> bool {
        self.combinations().is_empty()
    }
}

pub(crate) fn validate_values(which: &'static str, values: &[usize]) -> Result<(), WalkForwardError> {
    if values.is_empty() {
        return Err(WalkForwardError::EmptyParameterRange { which });
    }
    if values.contains(&0) {
        return Err(WalkForwardError::InvalidPeriod { which, value: 0 });
    }
    Ok(())
}

/// Valid pairs of `fast_values x slow_values` in canonical order.
pub fn candidate_pairs(fast_values: &[usize], slow_values: &[usize]) -> Vec<ParameterPair> {
    fast_values
        .iter()
        .flat_map(|&fast| slow_values.iter().map(move |&slow| ParameterPair::new(fast, slow)))
        .filter(ParameterPair::is_valid)
        .collect()
}

/// Winning pair of an in-sample search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub pair: ParameterPair,
    pub score: f64,
}

/// Best-scoring valid pair on `closes`, or `None` when no pair has `fast < slow`.
///
/// Pairs are scored in parallel but reduced in canonical order with a strict
/// greater-than, so on ties the earliest pair (fast outer, slow inner) wins.
pub fn best(closes: &[f64], fast_values: &[usize], slow_values: &[usize]) -> Option<SearchResult> {
    let candidates = candidate_pairs(fast_values, slow_values);
    let scores: Vec<f64> = candidates.par_iter().map(|pair| pair.score(closes)).collect();

    let mut best: Option<SearchResult> = None;
    let mut best_score = INVALID_SCORE;
    for (pair, score) in candidates.into_iter().zip(scores) {
        if score > best_score {
            best_score = score;
            best = Some(SearchResult { pair, score });
        }
    }
    best
}
