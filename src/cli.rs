//! CLI argument parsing for probe-estimator

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for estimation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "probe-estimator")]
#[command(version)]
#[command(about = "Regression-based size/effort estimation with prediction intervals", long_about = None)]
pub struct Cli {
    /// Print debug tracing to stderr (honours RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit the history and estimate with a prediction interval
    Estimate {
        /// TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Find x such that the t-density integrates to P over [0, x]
    TRange(TRangeArgs),
}

#[derive(Args, Debug)]
pub struct TRangeArgs {
    /// TOML file with probability/degrees_of_freedom; flags override it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target integral value, in (0, 0.5)
    #[arg(short, long, value_name = "P")]
    pub probability: Option<f64>,

    /// Degrees of freedom
    #[arg(short, long = "dof", value_name = "N")]
    pub dof: Option<f64>,

    /// Acceptable error
    #[arg(short, long, value_name = "E")]
    pub error: Option<f64>,

    /// Initial number of segments (even)
    #[arg(short, long, value_name = "S")]
    pub segments: Option<usize>,
}
