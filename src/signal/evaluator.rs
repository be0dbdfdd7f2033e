//! SMA crossover scoring.
//!
//! Scores a `(fast, slow)` pair on a close series as the additive
//! (non-compounding) cumulative return of a long/short crossover rule:
//! 1. Fast and slow simple moving averages
//! 2. Raw signal: long when fast > slow, short otherwise (warm-up included)
//! 3. Signal lagged by one bar, first bar flat
//! 4. Sum of lagged signal times bar return

use serde::{Deserialize, Serialize};

use super::rolling::{cumsum, lag, pct_change, rolling_mean};

/// Score assigned to pairs with `fast >= slow`. Below any regular score.
pub const INVALID_SCORE: f64 = f64::NEG_INFINITY;

/// Directional exposure held over a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    Flat,
}

impl Signal {
    /// Weight applied to the bar return.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
            Self::Flat => 0.0,
        }
    }
}

/// Raw crossover signal at each position.
///
/// Equality and undefined averages both map to `Short`.
pub fn raw_signal(closes: &[f64], fast: usize, slow: usize) -> Vec<Signal> {
    let fast_ma = rolling_mean(closes, fast);
    let slow_ma = rolling_mean(closes, slow);

    fast_ma
        .iter()
        .zip(&slow_ma)
        .map(|pair| match pair {
            (Some(f), Some(s)) if f > s => Signal::Long,
            _ => Signal::Short,
        })
        .collect()
}

/// Signal applied to the return realized at each position.
pub fn lagged_signal(closes: &[f64], fast: usize, slow: usize) -> Vec<Signal> {
    lag(&raw_signal(closes, fast, slow), Signal::Flat)
}

/// Running strategy P&L in return units.
pub fn equity_curve(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    let signals = lagged_signal(closes, fast, slow);
    let returns = pct_change(closes);

    let pnl: Vec<f64> = signals
        .iter()
        .zip(&returns)
        .map(|(signal, ret)| signal.weight() * ret)
        .collect();

    cumsum(&pnl)
}

/// Cumulative strategy return for `(fast, slow)` over `closes`.
///
/// Returns [`INVALID_SCORE`] when `fast >= slow`.
pub fn score(closes: &[f64], fast: usize, slow: usize) -> f64 {
    if fast >= slow {
        return INVALID_SCORE;
    }
    equity_curve(closes, fast, slow)
        .last()
        .copied()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RISING: [f64; 8] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

    #[test]
    fn test_invalid_pair_sentinel() {
        let series = [10.0, 11.0, 9.5];
        assert_eq!(score(&series, 3, 3), f64::NEG_INFINITY);
        assert_eq!(score(&series, 5, 2), f64::NEG_INFINITY);
        assert_eq!(score(&[42.0], 1, 1), INVALID_SCORE);
    }

    #[test]
    fn test_warmup_is_short_then_flat_lag() {
        let series = [10.0, 10.5, 11.0];
        let raw = raw_signal(&series, 2, 5);
        assert!(raw.iter().all(|s| *s == Signal::Short));

        let lagged = lagged_signal(&series, 2, 5);
        assert_eq!(lagged[0], Signal::Flat);
        assert!(lagged[1..].iter().all(|s| *s == Signal::Short));
    }

    #[test]
    fn test_rising_series_signals() {
        use Signal::*;
        assert_eq!(
            raw_signal(&RISING, 2, 3),
            vec![Short, Short, Long, Long, Long, Long, Long, Long]
        );
        assert_eq!(
            lagged_signal(&RISING, 2, 3),
            vec![Flat, Short, Short, Long, Long, Long, Long, Long]
        );
    }

    #[test]
    fn test_rising_series_score() {
        assert_relative_eq!(score(&RISING, 2, 3), -0.4071, epsilon = 1e-3);
    }

    #[test]
    fn test_equal_averages_count_as_short() {
        let flat = [5.0; 6];
        assert!(raw_signal(&flat, 2, 4).iter().all(|s| *s == Signal::Short));
        assert_eq!(score(&flat, 2, 4), 0.0);
    }

    #[test]
    fn test_two_bar_series_uses_warmup_signal() {
        // Bar 1 is weighted by the bar 0 signal, which is still in warm-up.
        let series = [1.0, 2.0];
        assert_eq!(equity_curve(&series, 1, 2), vec![0.0, -1.0]);
        assert_eq!(score(&series, 1, 2), -1.0);
    }

    #[test]
    fn test_falling_series_rewards_short() {
        let falling: Vec<f64> = RISING.iter().rev().copied().collect();
        assert!(score(&falling, 2, 3) > 0.0);
    }

    #[test]
    fn test_repeated_zero_prices_stay_finite() {
        // Returns: 0, -1, 0, 0; lagged short from the second bar
        assert_relative_eq!(score(&[2.0, 0.0, 0.0, 0.0], 1, 2), 1.0);
        assert_eq!(score(&[0.0; 6], 1, 3), 0.0);
    }

    #[test]
    fn test_single_price_scores_zero() {
        assert_eq!(score(&[100.0], 1, 2), 0.0);
    }
}
