//! Reduce per-window selections to one recommended pair.
//!
//! Records are grouped by the pair each window chose in-sample, and the
//! group with the highest mean out-of-sample score wins. Pairs that were
//! never chosen by any window take no part. A pair chosen once with a
//! lucky test score can therefore outrank one that was chosen often.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::WalkForwardError;
use super::grid::ParameterPair;
use super::optimizer::WindowRecord;

/// Out-of-sample statistics for one chosen pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    pub pair: ParameterPair,
    /// Number of windows that chose this pair.
    pub windows: usize,
    pub mean_test_score: f64,
}

/// Group records by chosen pair, in the order pairs were first chosen.
pub fn pair_statistics(records: &[WindowRecord]) -> Vec<PairStats> {
    let mut slots: HashMap<ParameterPair, usize> = HashMap::new();
    let mut groups: Vec<(ParameterPair, Vec<f64>)> = Vec::new();

    for record in records {
        let slot = *slots.entry(record.chosen_pair).or_insert_with(|| {
            groups.push((record.chosen_pair, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.test_score);
    }

    groups
        .into_iter()
        .map(|(pair, scores)| PairStats {
            pair,
            windows: scores.len(),
            mean_test_score: scores.iter().sum::<f64>() / scores.len() as f64,
        })
        .collect()
}

/// Pair with the highest mean test score among pairs actually chosen.
///
/// Ties go to the pair that was chosen first.
pub fn aggregate(records: &[WindowRecord]) -> Result<ParameterPair, WalkForwardError> {
    let stats = pair_statistics(records);
    let mut best: Option<&PairStats> = None;

    for candidate in &stats {
        let replace = match best {
            None => true,
            Some(current) => candidate.mean_test_score > current.mean_test_score,
        };
        if replace {
            best = Some(candidate);
        }
    }

    best.map(|s| s.pair)
        .ok_or(WalkForwardError::AggregationPrecondition)
}
