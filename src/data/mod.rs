pub mod loader;
pub mod types;

pub use loader::{FileFormat, LoaderError, PriceLoader, CLOSE_COLUMN, TIMESTAMP_COLUMN};
pub use types::{IndexKey, PriceSeries};
