use anyhow::{Context, Result};
use clap::Parser;
use probe_estimator::cli::{Cli, Command, OutputFormat, TRangeArgs};
use probe_estimator::config::{EstimationConfig, TRangeConfig};
use probe_estimator::engine::RegressionEngine;
use probe_estimator::quantile::QuantileSearch;
use probe_estimator::report::{EstimationReport, TRangeReport};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Fit the configured history and print the estimate
fn run_estimate(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = EstimationConfig::from_toml(config_path)?;
    let engine = RegressionEngine::from_history_file(&config.history_file, config.parameters());
    let result = engine.result().with_context(|| {
        format!(
            "Estimation failed for history data {}",
            config.history_file.display()
        )
    })?;

    let report = EstimationReport::new(
        config_path,
        &config.history_file,
        config.sizes(),
        config.prediction_interval_rate,
        &result,
    );
    match format {
        OutputFormat::Text => {
            println!("{}", report.to_text());
        }
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Csv => print!("{}", report.to_csv()),
    }
    Ok(())
}

/// Merge file and flag settings for the standalone search
fn t_range_config(args: &TRangeArgs) -> Result<TRangeConfig> {
    let mut config = match &args.config {
        Some(path) => TRangeConfig::from_toml(path)?,
        None => TRangeConfig::default(),
    };
    if let Some(probability) = args.probability {
        config.probability = probability;
    }
    if let Some(dof) = args.dof {
        config.degrees_of_freedom = dof;
    }
    if let Some(error) = args.error {
        config.acceptable_error = error;
    }
    if let Some(segments) = args.segments {
        config.initial_segments = segments;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid t-range settings: {}", e))?;
    Ok(config)
}

fn run_t_range(args: &TRangeArgs, format: OutputFormat) -> Result<()> {
    let config = t_range_config(args)?;
    let solution = QuantileSearch::new(
        config.probability,
        config.degrees_of_freedom,
        config.acceptable_error,
        config.initial_segments,
    )?
    .resolve()
    .context("Critical value search failed")?;

    let report = TRangeReport::new(
        config.probability,
        config.degrees_of_freedom,
        config.acceptable_error,
        &solution,
    );
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Csv => print!("{}", report.to_csv()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match &args.command {
        Command::Estimate { config } => run_estimate(config, args.format),
        Command::TRange(t_range) => run_t_range(t_range, args.format),
    }
}
