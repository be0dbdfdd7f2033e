//! Walk-forward window generation.
//!
//! Splits a series of `length` prices into consecutive train/test windows.
//! Each window holds `train_window` training prices followed immediately by
//! `test_window` test prices; the window start advances by `test_window`,
//! so test slices tile the series without overlap.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::error::WalkForwardError;

/// Position bounds of one walk-forward window. Ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub train_start: usize,
    pub train_end: usize,
    pub test_start: usize,
    pub test_end: usize,
}

impl WindowBounds {
    pub fn train_range(&self) -> Range<usize> {
        self.train_start..self.train_end
    }

    pub fn test_range(&self) -> Range<usize> {
        self.test_start..self.test_end
    }

    /// Start offset of the window in the series.
    pub fn offset(&self) -> usize {
        self.train_start
    }
}

/// Generator for walk-forward windows over a series of fixed length.
#[derive(Debug, Clone)]
pub struct WalkForwardWindows {
    length: usize,
    train_window: usize,
    test_window: usize,
}

impl WalkForwardWindows {
    /// Validate sizes. Fails unless both windows are non-empty and fit in the series.
    pub fn new(length: usize, train_window: usize, test_window: usize) -> Result<Self, WalkForwardError> {
        let fits = train_window
            .checked_add(test_window)
            .is_some_and(|required| required <= length);

        if train_window == 0 || test_window == 0 || !fits {
            return Err(WalkForwardError::InsufficientData {
                length,
                train_window,
                test_window,
            });
        }

        Ok(Self {
            length,
            train_window,
            test_window,
        })
    }

    /// Number of windows: `(length - train - test) / test + 1`.
    pub fn expected_windows(&self) -> usize {
        (self.length - self.train_window - self.test_window) / self.test_window + 1
    }

    /// Generate all windows in increasing offset order.
    pub fn generate(&self) -> Vec<WindowBounds> {
        let last_start = self.length - self.train_window - self.test_window;

        (0..=last_start)
            .step_by(self.test_window)
            .map(|start| {
                let train_end = start + self.train_window;
                WindowBounds {
                    train_start: start,
                    train_end,
                    test_start: train_end,
                    test_end: train_end + self.test_window,
                }
            })
            .collect()
    }
}

/// Partition `length` prices into walk-forward windows.
pub fn windows(
    length: usize,
    train_window: usize,
    test_window: usize,
) -> Result<Vec<WindowBounds>, WalkForwardError> {
    Ok(WalkForwardWindows::new(length, train_window, test_window)?.generate())
}
