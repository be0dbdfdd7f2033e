//! Walk-forward parameter optimization.
//!
//! For each window: grid search on the training slice, then score the
//! winning pair on the following test slice. Windows whose search finds no
//! valid pair are skipped and do not consume a window index.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::PriceSeries;
use crate::signal::score;

use super::aggregate::{aggregate, pair_statistics, PairStats};
use super::error::WalkForwardError;
use super::grid::{best, validate_values, ParameterGrid, ParameterPair};
use super::periods::{WalkForwardWindows, WindowBounds};

/// Result of one accepted walk-forward window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Index among emitted records, starting at 0.
    pub window_index: usize,
    /// Train and test position bounds.
    pub bounds: WindowBounds,
    /// Best in-sample pair.
    pub chosen_pair: ParameterPair,
    /// In-sample score of the chosen pair.
    pub train_score: f64,
    /// Out-of-sample score of the chosen pair.
    pub test_score: f64,
}

/// Outcome of evaluating one window boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Selected {
        bounds: WindowBounds,
        pair: ParameterPair,
        train_score: f64,
        test_score: f64,
    },
    NoValidCandidate {
        bounds: WindowBounds,
    },
}

/// Search the training slice, then score the winner on the test slice.
pub fn evaluate_window(
    series: &PriceSeries,
    bounds: WindowBounds,
    fast_values: &[usize],
    slow_values: &[usize],
) -> WindowOutcome {
    let train = series.slice(bounds.train_range());

    match best(train, fast_values, slow_values) {
        Some(found) => {
            let test = series.slice(bounds.test_range());
            let test_score = score(test, found.pair.fast, found.pair.slow);
            WindowOutcome::Selected {
                bounds,
                pair: found.pair,
                train_score: found.score,
                test_score,
            }
        }
        None => WindowOutcome::NoValidCandidate { bounds },
    }
}

/// Drop skipped windows and number the rest in boundary order.
pub fn collect_records(outcomes: Vec<WindowOutcome>) -> Vec<WindowRecord> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            WindowOutcome::Selected {
                bounds,
                pair,
                train_score,
                test_score,
            } => Some((bounds, pair, train_score, test_score)),
            WindowOutcome::NoValidCandidate { bounds } => {
                warn!(
                    "Skipping window at offset {}: no pair with fast < slow",
                    bounds.offset()
                );
                None
            }
        })
        .enumerate()
        .map(|(window_index, (bounds, chosen_pair, train_score, test_score))| WindowRecord {
            window_index,
            bounds,
            chosen_pair,
            train_score,
            test_score,
        })
        .collect()
}

/// Run the walk-forward loop.
///
/// Returns an empty vector when every window was skipped; callers decide
/// whether that is fatal.
pub fn run(
    series: &PriceSeries,
    train_window: usize,
    test_window: usize,
    fast_values: &[usize],
    slow_values: &[usize],
) -> Result<Vec<WindowRecord>, WalkForwardError> {
    let (records, _) = run_windows(series, train_window, test_window, fast_values, slow_values)?;
    Ok(records)
}

/// Accepted records plus the number of boundaries generated.
fn run_windows(
    series: &PriceSeries,
    train_window: usize,
    test_window: usize,
    fast_values: &[usize],
    slow_values: &[usize],
) -> Result<(Vec<WindowRecord>, usize), WalkForwardError> {
    validate_values("fast", fast_values)?;
    validate_values("slow", slow_values)?;

    let windows = WalkForwardWindows::new(series.len(), train_window, test_window)?;
    let boundaries = windows.generate();
    info!(
        "Generated {} walk-forward windows (train={}, test={})",
        boundaries.len(),
        train_window,
        test_window
    );

    let outcomes: Vec<WindowOutcome> = boundaries
        .iter()
        .enumerate()
        .map(|(i, bounds)| {
            let outcome = evaluate_window(series, *bounds, fast_values, slow_values);
            if let WindowOutcome::Selected {
                pair,
                train_score,
                test_score,
                ..
            } = &outcome
            {
                debug!(
                    "Window {}/{}: train {:?}, test {:?}, best {} train={:.4} test={:.4}",
                    i + 1,
                    boundaries.len(),
                    bounds.train_range(),
                    bounds.test_range(),
                    pair,
                    train_score,
                    test_score
                );
            }
            outcome
        })
        .collect();

    Ok((collect_records(outcomes), boundaries.len()))
}

/// Complete walk-forward optimization result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkForwardResult {
    /// Accepted windows in order.
    pub records: Vec<WindowRecord>,
    /// Aggregated recommendation.
    pub selection: ParameterPair,
    pub train_window: usize,
    pub test_window: usize,
    /// Boundaries generated, skipped ones included.
    pub boundaries: usize,
}

impl WalkForwardResult {
    /// Average out-of-sample score across all accepted windows.
    pub fn avg_test_score(&self) -> f64 {
        mean(self.records.iter().map(|r| r.test_score))
    }

    /// Average in-sample score across all accepted windows.
    pub fn avg_train_score(&self) -> f64 {
        mean(self.records.iter().map(|r| r.train_score))
    }

    /// Number of windows that chose the selected pair.
    pub fn selection_frequency(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.chosen_pair == self.selection)
            .count()
    }

    /// Per-pair out-of-sample statistics, in first-chosen order.
    pub fn pair_statistics(&self) -> Vec<PairStats> {
        pair_statistics(&self.records)
    }

    /// Get summary string.
    pub fn summary(&self) -> String {
        format!(
            "Walk-Forward Results: {} windows ({} skipped)\n\
             Avg Train Score: {:.4}\n\
             Avg Test Score: {:.4}\n\
             Selected: {} (chosen in {} windows)",
            self.records.len(),
            self.boundaries - self.records.len(),
            self.avg_train_score(),
            self.avg_test_score(),
            self.selection,
            self.selection_frequency()
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Walk-forward optimizer: run, reject empty results, aggregate.
#[derive(Debug, Clone)]
pub struct WalkForwardOptimizer {
    train_window: usize,
    test_window: usize,
    param_grid: ParameterGrid,
}

impl WalkForwardOptimizer {
    /// Create a new optimizer with the default grid.
    pub fn new(train_window: usize, test_window: usize) -> Self {
        Self {
            train_window,
            test_window,
            param_grid: ParameterGrid::default(),
        }
    }

    /// Set parameter grid.
    pub fn with_param_grid(mut self, grid: ParameterGrid) -> Self {
        self.param_grid = grid;
        self
    }

    pub fn param_grid(&self) -> &ParameterGrid {
        &self.param_grid
    }

    /// Run walk-forward optimization over `series`.
    pub fn optimize(&self, series: &PriceSeries) -> Result<WalkForwardResult, WalkForwardError> {
        info!(
            "Parameter combinations: {} valid of {}",
            self.param_grid.combinations().len(),
            self.param_grid.total_combinations()
        );
        if self.param_grid.is_degenerate() {
            warn!("No fast period is below any slow period; every window will be skipped");
        }

        let (records, boundaries) = run_windows(
            series,
            self.train_window,
            self.test_window,
            &self.param_grid.fast_values,
            &self.param_grid.slow_values,
        )?;

        if records.is_empty() {
            return Err(WalkForwardError::NoValidWindows { boundaries });
        }

        let selection = aggregate(&records)?;
        info!(
            "Completed {} walk-forward windows, selected {}",
            records.len(),
            selection
        );

        Ok(WalkForwardResult {
            records,
            selection,
            train_window: self.train_window,
            test_window: self.test_window,
            boundaries,
        })
    }
}
