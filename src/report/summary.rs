//! Per-window summary table.

use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::data::{IndexKey, PriceSeries};
use crate::walkforward::WindowRecord;

use super::{write_atomic, ReportError};

/// One summary row. Start/end keys are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub window: usize,
    pub train_start: IndexKey,
    pub train_end: IndexKey,
    pub test_start: IndexKey,
    pub test_end: IndexKey,
    pub fast: usize,
    pub slow: usize,
    pub train_score: f64,
    pub test_score: f64,
}

/// Resolve record bounds to index keys of `series`.
pub fn summary_rows(records: &[WindowRecord], series: &PriceSeries) -> Vec<SummaryRow> {
    records
        .iter()
        .map(|r| SummaryRow {
            window: r.window_index,
            train_start: series.key_at(r.bounds.train_start),
            train_end: series.key_at(r.bounds.train_end - 1),
            test_start: series.key_at(r.bounds.test_start),
            test_end: series.key_at(r.bounds.test_end - 1),
            fast: r.chosen_pair.fast,
            slow: r.chosen_pair.slow,
            train_score: r.train_score,
            test_score: r.test_score,
        })
        .collect()
}

/// Build the summary table as a DataFrame.
pub fn summary_dataframe(rows: &[SummaryRow]) -> Result<DataFrame, ReportError> {
    let keys = |f: fn(&SummaryRow) -> IndexKey| -> Vec<String> {
        rows.iter().map(|r| f(r).to_string()).collect()
    };

    let df = df!(
        "window" => rows.iter().map(|r| r.window as u64).collect::<Vec<_>>(),
        "train_start" => keys(|r| r.train_start),
        "train_end" => keys(|r| r.train_end),
        "test_start" => keys(|r| r.test_start),
        "test_end" => keys(|r| r.test_end),
        "fast" => rows.iter().map(|r| r.fast as u64).collect::<Vec<_>>(),
        "slow" => rows.iter().map(|r| r.slow as u64).collect::<Vec<_>>(),
        "train_score" => rows.iter().map(|r| r.train_score).collect::<Vec<_>>(),
        "test_score" => rows.iter().map(|r| r.test_score).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Write the summary table. `.json` paths get a JSON array, others CSV.
pub fn write_summary(
    records: &[WindowRecord],
    series: &PriceSeries,
    path: &Path,
) -> Result<(), ReportError> {
    let rows = summary_rows(records, series);

    let contents = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::to_vec_pretty(&rows)?,
        _ => {
            let mut df = summary_dataframe(&rows)?;
            let mut buf = Vec::new();
            CsvWriter::new(&mut buf).include_header(true).finish(&mut df)?;
            buf
        }
    };

    write_atomic(path, &contents)?;
    info!("Summary of {} windows written to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walkforward::{ParameterPair, WindowBounds};
    use chrono::NaiveDate;

    fn records() -> Vec<WindowRecord> {
        vec![
            WindowRecord {
                window_index: 0,
                bounds: WindowBounds {
                    train_start: 0,
                    train_end: 4,
                    test_start: 4,
                    test_end: 6,
                },
                chosen_pair: ParameterPair::new(1, 3),
                train_score: 0.5,
                test_score: -0.25,
            },
            WindowRecord {
                window_index: 1,
                bounds: WindowBounds {
                    train_start: 2,
                    train_end: 6,
                    test_start: 6,
                    test_end: 8,
                },
                chosen_pair: ParameterPair::new(2, 3),
                train_score: 0.125,
                test_score: 0.75,
            },
        ]
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("sma_walkforward_summary_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_rows_use_inclusive_position_keys() {
        let series = PriceSeries::new((1..=8).map(f64::from).collect()).unwrap();
        let rows = summary_rows(&records(), &series);

        assert_eq!(rows[0].train_start, IndexKey::Position(0));
        assert_eq!(rows[0].train_end, IndexKey::Position(3));
        assert_eq!(rows[0].test_start, IndexKey::Position(4));
        assert_eq!(rows[0].test_end, IndexKey::Position(5));
        assert_eq!(rows[1].test_end, IndexKey::Position(7));
        assert_eq!((rows[1].fast, rows[1].slow), (2, 3));
    }

    #[test]
    fn test_rows_use_timestamps() {
        let stamps = (1..=8)
            .map(|d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
            .collect();
        let series = PriceSeries::with_timestamps((1..=8).map(f64::from).collect(), stamps).unwrap();
        let rows = summary_rows(&records(), &series);

        assert_eq!(rows[0].test_start.to_string(), "2024-02-05 00:00:00");
    }

    #[test]
    fn test_dataframe_columns() {
        let series = PriceSeries::new((1..=8).map(f64::from).collect()).unwrap();
        let df = summary_dataframe(&summary_rows(&records(), &series)).unwrap();

        assert_eq!(df.height(), 2);
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "window",
                "train_start",
                "train_end",
                "test_start",
                "test_end",
                "fast",
                "slow",
                "train_score",
                "test_score"
            ]
        );
    }

    #[test]
    fn test_write_csv() {
        let series = PriceSeries::new((1..=8).map(f64::from).collect()).unwrap();
        let path = temp_path("summary.csv");
        write_summary(&records(), &series, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "window,train_start,train_end,test_start,test_end,fast,slow,train_score,test_score"
        );
        assert!(lines.next().unwrap().starts_with("0,0,3,4,5,1,3,"));
    }

    #[test]
    fn test_write_json() {
        let series = PriceSeries::new((1..=8).map(f64::from).collect()).unwrap();
        let path = temp_path("summary.json");
        write_summary(&records(), &series, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[1]["window"], 1);
        assert_eq!(value[1]["test_end"], 7);
        assert_eq!(value[0]["test_score"], -0.25);
    }
}
