//! Walk-forward optimizer for SMA crossover strategies.
//!
//! # Usage
//!
//! ```bash
//! # Select fast/slow periods out-of-sample and write a strategy config
//! sma-walkforward optimize --data data/btcusdt_1h.parquet --summary-csv results/windows.csv
//!
//! # Same, with settings from a file and one override
//! sma-walkforward optimize --data data/btcusdt_1h.csv --config config/optimize.toml --test-window 100
//!
//! # Score one pair on the full series
//! sma-walkforward score --data data/btcusdt_1h.csv --fast 10 --slow 30
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sma_walkforward::config::{parse_range, OptimizeConfig};
use sma_walkforward::data::PriceLoader;
use sma_walkforward::report::{write_summary, StrategyConfig};
use sma_walkforward::signal::{score, INVALID_SCORE};

#[derive(Parser)]
#[command(name = "sma-walkforward")]
#[command(about = "Walk-forward optimizer for SMA crossover")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run walk-forward optimization and write the selected strategy config
    Optimize {
        /// Path to CSV/Parquet data with a 'close' column
        #[arg(short, long)]
        data: PathBuf,

        /// Optional TOML file with optimization settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Symbol written into the strategy config
        #[arg(long)]
        symbol: Option<String>,

        /// Training window length in bars
        #[arg(long)]
        train_window: Option<usize>,

        /// Test window length in bars
        #[arg(long)]
        test_window: Option<usize>,

        /// Comma-separated fast periods
        #[arg(long)]
        fast_range: Option<String>,

        /// Comma-separated slow periods
        #[arg(long)]
        slow_range: Option<String>,

        /// Optional output for per-window stats (.csv or .json)
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Location to write the resulting strategy config
        #[arg(long)]
        config_output: Option<PathBuf>,
    },

    /// Score a single fast/slow pair on the whole series
    Score {
        /// Path to CSV/Parquet data with a 'close' column
        #[arg(short, long)]
        data: PathBuf,

        /// Fast moving-average period
        #[arg(long)]
        fast: usize,

        /// Slow moving-average period
        #[arg(long)]
        slow: usize,
    },
}

struct OptimizeOverrides {
    symbol: Option<String>,
    train_window: Option<usize>,
    test_window: Option<usize>,
    fast_range: Option<String>,
    slow_range: Option<String>,
    summary_csv: Option<PathBuf>,
    config_output: Option<PathBuf>,
}

impl OptimizeOverrides {
    fn apply(self, config: &mut OptimizeConfig) -> Result<()> {
        if let Some(symbol) = self.symbol {
            config.symbol = symbol;
        }
        if let Some(train_window) = self.train_window {
            config.train_window = train_window;
        }
        if let Some(test_window) = self.test_window {
            config.test_window = test_window;
        }
        if let Some(range) = self.fast_range {
            config.fast_values = parse_range(&range).context("Invalid --fast-range")?;
        }
        if let Some(range) = self.slow_range {
            config.slow_values = parse_range(&range).context("Invalid --slow-range")?;
        }
        if let Some(path) = self.summary_csv {
            config.summary_output = Some(path);
        }
        if let Some(path) = self.config_output {
            config.config_output = path;
        }
        Ok(())
    }
}

fn cmd_optimize(data: PathBuf, config_path: Option<PathBuf>, overrides: OptimizeOverrides) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => OptimizeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OptimizeConfig::default(),
    };
    overrides.apply(&mut config)?;
    debug!("Optimize config: {:?}", config);

    let series = PriceLoader::new(&data)
        .load_close_series()
        .with_context(|| format!("Failed to load {}", data.display()))?;

    let result = config.optimizer()?.optimize(&series)?;

    // Artifacts are only written once the whole run has succeeded.
    if let Some(path) = &config.summary_output {
        write_summary(&result.records, &series, path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    let strategy = StrategyConfig::from_result(&config.strategy_name, &config.symbol, &result);
    strategy
        .write(&config.config_output)
        .with_context(|| format!("Failed to write config {}", config.config_output.display()))?;

    println!("Completed {} walk-forward windows", result.records.len());
    println!("Average test score: {:.4}", result.avg_test_score());
    println!(
        "Selected params -> fast={}, slow={}",
        result.selection.fast, result.selection.slow
    );
    println!("Config written to {}", config.config_output.display());
    if let Some(path) = &config.summary_output {
        println!("Summary written to {}", path.display());
    }
    debug!("{}", result.summary());

    Ok(())
}

fn cmd_score(data: PathBuf, fast: usize, slow: usize) -> Result<()> {
    let series = PriceLoader::new(&data)
        .load_close_series()
        .with_context(|| format!("Failed to load {}", data.display()))?;

    let value = score(series.closes(), fast, slow);
    if value == INVALID_SCORE {
        println!("fast={} slow={}: invalid pair (fast must be below slow)", fast, slow);
    } else {
        println!(
            "fast={} slow={}: cumulative return {:.4} over {} bars",
            fast,
            slow,
            value,
            series.len()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sma_walkforward=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            data,
            config,
            symbol,
            train_window,
            test_window,
            fast_range,
            slow_range,
            summary_csv,
            config_output,
        } => {
            let overrides = OptimizeOverrides {
                symbol,
                train_window,
                test_window,
                fast_range,
                slow_range,
                summary_csv,
                config_output,
            };
            cmd_optimize(data, config, overrides)?;
        }
        Commands::Score { data, fast, slow } => {
            cmd_score(data, fast, slow)?;
        }
    }

    Ok(())
}
