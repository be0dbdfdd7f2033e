//! Walk-forward validation module.
//!
//! Rolling train/test optimization of SMA crossover periods:
//! - Windows: fixed-size train slice followed by a test slice, rolled by the test size
//! - Search: exhaustive grid over fast/slow periods on each train slice
//! - Aggregate: highest mean test score among the pairs windows chose

pub mod aggregate;
pub mod error;
pub mod grid;
pub mod optimizer;
pub mod periods;

pub use aggregate::{aggregate, pair_statistics, PairStats};
pub use error::WalkForwardError;
pub use grid::{best, ParameterGrid, ParameterPair, SearchResult};
pub use optimizer::{run, WalkForwardOptimizer, WalkForwardResult, WindowOutcome, WindowRecord};
pub use periods::{windows, WalkForwardWindows, WindowBounds};
