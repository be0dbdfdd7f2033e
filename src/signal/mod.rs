//! Signal evaluation for the SMA crossover rule.

pub mod evaluator;
pub mod rolling;

pub use evaluator::{equity_curve, lagged_signal, raw_signal, score, Signal, INVALID_SCORE};
