//! Price loader for CSV and parquet files.
//!
//! Reads a table with a `close` column and an optional `timestamp` column
//! into a [`PriceSeries`]. Timestamps may be stored as strings, polars
//! datetimes or dates, or integer epoch seconds.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::types::PriceSeries;

/// Column holding closing prices.
pub const CLOSE_COLUMN: &str = "close";

/// Optional column holding bar timestamps.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedFormat(String),

    #[error("Input data must contain a '{0}' column")]
    MissingColumn(&'static str),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported input formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            Some(ext) => Err(LoaderError::UnsupportedFormat(format!(".{}", ext))),
            None => Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Loader for a single price file.
pub struct PriceLoader {
    path: PathBuf,
}

impl PriceLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan the file lazily.
    pub fn load_lazy(&self) -> Result<LazyFrame, LoaderError> {
        let format = FileFormat::from_path(&self.path)?;
        fs::metadata(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoaderError::FileNotFound(self.path.display().to_string()),
            _ => LoaderError::Io(e),
        })?;

        let lf = match format {
            FileFormat::Csv => LazyCsvReader::new(&self.path)
                .with_has_header(true)
                .with_infer_schema_length(Some(1024))
                .finish()?,
            FileFormat::Parquet => LazyFrame::scan_parquet(&self.path, ScanArgsParquet::default())?,
        };
        Ok(lf)
    }

    /// Load the whole file as a DataFrame.
    pub fn load_dataframe(&self) -> Result<DataFrame, LoaderError> {
        Ok(self.load_lazy()?.collect()?)
    }

    /// Load the closing price series.
    pub fn load_close_series(&self) -> Result<PriceSeries, LoaderError> {
        let df = self.load_dataframe()?;
        let series = dataframe_to_series(&df)?;
        info!(
            "Loaded {} prices from {} ({})",
            series.len(),
            self.path.display(),
            if series.has_timestamps() { "timestamp index" } else { "position index" }
        );
        Ok(series)
    }
}

/// Convert a DataFrame with `close` (and optionally `timestamp`) columns.
pub fn dataframe_to_series(df: &DataFrame) -> Result<PriceSeries, LoaderError> {
    let close = df
        .column(CLOSE_COLUMN)
        .map_err(|_| LoaderError::MissingColumn(CLOSE_COLUMN))?
        .cast(&DataType::Float64)?;

    let closes = close
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(price) if price.is_finite() => Ok(price),
            Some(price) => Err(LoaderError::InvalidData(format!(
                "non-finite close {} at row {}",
                price, row
            ))),
            None => Err(LoaderError::InvalidData(format!("missing close at row {}", row))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    match df.column(TIMESTAMP_COLUMN) {
        Ok(column) => {
            debug!("Using '{}' column ({}) as index", TIMESTAMP_COLUMN, column.dtype());
            let timestamps = timestamps_from_column(column)?;
            PriceSeries::with_timestamps(closes, timestamps)
        }
        Err(_) => PriceSeries::new(closes),
    }
}

fn timestamps_from_column(column: &Column) -> Result<Vec<NaiveDateTime>, LoaderError> {
    match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let raw = value.ok_or_else(|| null_timestamp(row))?;
                parse_timestamp(raw).ok_or_else(|| {
                    LoaderError::InvalidData(format!("unparseable timestamp '{}' at row {}", raw, row))
                })
            })
            .collect(),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = column.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let v = value.ok_or_else(|| null_timestamp(row))?;
                    datetime_from_epoch(v, unit).ok_or_else(|| out_of_range(v, row))
                })
                .collect()
        }
        DataType::Date => {
            let raw = column.cast(&DataType::Int32)?;
            raw.i32()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let days = value.ok_or_else(|| null_timestamp(row))?;
                    date_from_days(days)
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .ok_or_else(|| out_of_range(days as i64, row))
                })
                .collect()
        }
        DataType::Int32 | DataType::Int64 | DataType::UInt32 | DataType::UInt64 => {
            let raw = column.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let secs = value.ok_or_else(|| null_timestamp(row))?;
                    DateTime::from_timestamp(secs, 0)
                        .map(|dt| dt.naive_utc())
                        .ok_or_else(|| out_of_range(secs, row))
                })
                .collect()
        }
        other => Err(LoaderError::InvalidData(format!(
            "'{}' column has unsupported type {}",
            TIMESTAMP_COLUMN, other
        ))),
    }
}

/// Parse a timestamp string in any of the accepted layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn datetime_from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    dt.map(|dt| dt.naive_utc())
}

/// Convert days since Unix epoch to NaiveDate.
fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + 719163)
}

fn null_timestamp(row: usize) -> LoaderError {
    LoaderError::InvalidData(format!("missing timestamp at row {}", row))
}

fn out_of_range(value: i64, row: usize) -> LoaderError {
    LoaderError::InvalidData(format!("timestamp {} out of range at row {}", value, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndexKey;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sma_walkforward_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_date_from_days() {
        let date = date_from_days(18262).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.csv")).unwrap(), FileFormat::Csv);
        assert_eq!(
            FileFormat::from_path(Path::new("a.parquet")).unwrap(),
            FileFormat::Parquet
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("a.xlsx")),
            Err(LoaderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let loader = PriceLoader::new("does/not/exist.csv");
        assert!(matches!(
            loader.load_close_series(),
            Err(LoaderError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let file = fixture("plain.csv", "close\n1\n");
        let loader = PriceLoader::new(file.join("nested.csv"));
        assert!(matches!(loader.load_close_series(), Err(LoaderError::Io(_))));
    }

    #[test]
    fn test_load_csv_with_timestamps() {
        let path = fixture(
            "with_ts.csv",
            "timestamp,open,close\n2024-01-01,1,10.0\n2024-01-02,1,10.5\n2024-01-03,1,11\n",
        );
        let series = PriceLoader::new(&path).load_close_series().unwrap();
        assert_eq!(series.closes(), &[10.0, 10.5, 11.0]);
        assert!(series.has_timestamps());
        assert_eq!(series.key_at(2).to_string(), "2024-01-03 00:00:00");
    }

    #[test]
    fn test_load_csv_without_timestamps() {
        let path = fixture("no_ts.csv", "close\n1\n2\n3\n4\n");
        let series = PriceLoader::new(&path).load_close_series().unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.key_at(3), IndexKey::Position(3));
    }

    #[test]
    fn test_missing_close_column() {
        let path = fixture("no_close.csv", "open,high\n1,2\n");
        let result = PriceLoader::new(&path).load_close_series();
        assert!(matches!(result, Err(LoaderError::MissingColumn("close"))));
    }

    #[test]
    fn test_unordered_timestamps_rejected() {
        let path = fixture(
            "unordered.csv",
            "timestamp,close\n2024-01-02,1\n2024-01-01,2\n",
        );
        let result = PriceLoader::new(&path).load_close_series();
        assert!(matches!(result, Err(LoaderError::InvalidData(_))));
    }

    #[test]
    fn test_dataframe_with_epoch_seconds() {
        let df = df!(
            "timestamp" => &[1_700_000_000i64, 1_700_000_060],
            "close" => &[100.0, 101.0]
        )
        .unwrap();
        let series = dataframe_to_series(&df).unwrap();
        assert_eq!(
            series.key_at(1),
            IndexKey::Timestamp(DateTime::from_timestamp(1_700_000_060, 0).unwrap().naive_utc())
        );
    }

    #[test]
    fn test_dataframe_with_datetime_millis() {
        let mut df = df!(
            "timestamp" => &[1_700_000_000_000i64, 1_700_000_000_500],
            "close" => &[100.0, 101.0]
        )
        .unwrap();
        let stamps = df
            .column("timestamp")
            .unwrap()
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        df.with_column(stamps).unwrap();

        let series = dataframe_to_series(&df).unwrap();
        assert_eq!(
            series.key_at(1),
            IndexKey::Timestamp(
                DateTime::from_timestamp_millis(1_700_000_000_500)
                    .unwrap()
                    .naive_utc()
            )
        );
    }

    #[test]
    fn test_dataframe_with_dates() {
        // 19723 days after the epoch is 2024-01-01
        let mut df = df!(
            "timestamp" => &[19723i32, 19724, 19725],
            "close" => &[10.0, 11.0, 12.0]
        )
        .unwrap();
        let dates = df.column("timestamp").unwrap().cast(&DataType::Date).unwrap();
        df.with_column(dates).unwrap();

        let series = dataframe_to_series(&df).unwrap();
        assert_eq!(
            series.key_at(2),
            IndexKey::Timestamp(
                NaiveDate::from_ymd_opt(2024, 1, 3)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_load_parquet() {
        let dir = std::env::temp_dir().join(format!("sma_walkforward_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prices.parquet");

        let mut df = df!(
            "timestamp" => &[1_700_000_000i64, 1_700_003_600, 1_700_007_200],
            "close" => &[50.0, 51.5, 49.0]
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();

        let series = PriceLoader::new(&path).load_close_series().unwrap();
        assert_eq!(series.closes(), &[50.0, 51.5, 49.0]);
        assert_eq!(
            series.key_at(0),
            IndexKey::Timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc())
        );
    }
}
