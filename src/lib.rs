pub mod config;
pub mod data;
pub mod report;
pub mod signal;
pub mod walkforward;

// Re-export commonly used types
pub use config::{parse_range, ConfigError, OptimizeConfig};
pub use data::{IndexKey, LoaderError, PriceLoader, PriceSeries};
pub use report::{ReportError, StrategyConfig};
pub use signal::{score, INVALID_SCORE};
pub use walkforward::{
    aggregate, run, windows, ParameterGrid, ParameterPair, WalkForwardError, WalkForwardOptimizer,
    WalkForwardResult, WindowRecord,
};
