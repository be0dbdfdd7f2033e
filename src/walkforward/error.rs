use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkForwardError {
    #[error(
        "Not enough data for the requested windows: {length} prices, need train_window ({train_window}) + test_window ({test_window}) with both > 0"
    )]
    InsufficientData {
        length: usize,
        train_window: usize,
        test_window: usize,
    },

    #[error("At least one {which} period must be provided")]
    EmptyParameterRange { which: &'static str },

    #[error("Invalid {which} period {value}: periods must be positive")]
    InvalidPeriod { which: &'static str, value: usize },

    #[error("Walk-forward run produced no valid windows ({boundaries} boundaries, all skipped)")]
    NoValidWindows { boundaries: usize },

    #[error("Cannot aggregate an empty set of window records")]
    AggregationPrecondition,
}
