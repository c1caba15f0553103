//! Configuration files for estimation runs
//!
//! Two TOML layouts: [`EstimationConfig`] drives a full regression estimate,
//! [`TRangeConfig`] drives the standalone critical-value search.

use crate::dataset::HISTORY_FIELDS;
use crate::engine::{EstimationParameters, ProxySizes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_dimension() -> usize {
    HISTORY_FIELDS
}

fn default_prediction_interval_rate() -> f64 {
    0.70
}

fn default_acceptable_error() -> f64 {
    0.00001
}

fn default_initial_segments() -> usize {
    10
}

fn validate_tolerance(acceptable_error: f64, initial_segments: usize) -> Result<(), String> {
    if !(acceptable_error.is_finite() && acceptable_error > 0.0) {
        return Err(format!(
            "acceptable_error must be positive, got {}",
            acceptable_error
        ));
    }

    if initial_segments < 2 || initial_segments % 2 != 0 {
        return Err(format!(
            "initial_segments must be even and >= 2, got {}",
            initial_segments
        ));
    }

    Ok(())
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration: {}", path.display()))
}

/// Configuration for a regression estimate with prediction interval
///
/// # Example TOML
/// ```toml
/// history_file = "history.tsv"
/// prediction_interval_rate = 0.70
/// acceptable_error = 0.00001
/// initial_segments = 10
/// added_size = 650.0
/// reused_size = 3000.0
/// modified_size = 155.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimationConfig {
    /// Tab-separated history; relative paths resolve against the config file
    pub history_file: PathBuf,

    /// Fields per history line
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Two-sided confidence rate of the prediction interval
    ///
    /// - 0.70 (default): the customary PSP 70% interval
    /// - 0.90: wider interval, more likely to contain the actual value
    #[serde(default = "default_prediction_interval_rate")]
    pub prediction_interval_rate: f64,

    /// Base tolerance; the critical-value search runs 100 times tighter
    #[serde(default = "default_acceptable_error")]
    pub acceptable_error: f64,

    /// Initial Simpson segment count
    #[serde(default = "default_initial_segments")]
    pub initial_segments: usize,

    /// Estimated added size (w)
    pub added_size: f64,

    /// Estimated reused size (x)
    pub reused_size: f64,

    /// Estimated modified size (y)
    pub modified_size: f64,
}

impl EstimationConfig {
    /// Load and validate a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML for this
    /// layout, or fails [`EstimationConfig::validate`].
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Self = read_toml(path)?;

        if config.history_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.history_file = dir.join(&config.history_file);
            }
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension != HISTORY_FIELDS {
            return Err(format!(
                "dimension must be {} for a three-predictor model, got {}",
                HISTORY_FIELDS, self.dimension
            ));
        }

        if !(self.prediction_interval_rate > 0.0 && self.prediction_interval_rate < 1.0) {
            return Err(format!(
                "prediction_interval_rate must be in (0, 1), got {}",
                self.prediction_interval_rate
            ));
        }

        validate_tolerance(self.acceptable_error, self.initial_segments)?;

        for (name, value) in [
            ("added_size", self.added_size),
            ("reused_size", self.reused_size),
            ("modified_size", self.modified_size),
        ] {
            if !value.is_finite() {
                return Err(format!("{} must be finite, got {}", name, value));
            }
        }

        Ok(())
    }

    pub fn sizes(&self) -> ProxySizes {
        ProxySizes::new(self.added_size, self.reused_size, self.modified_size)
    }

    /// Engine parameters described by this configuration
    pub fn parameters(&self) -> EstimationParameters {
        EstimationParameters {
            prediction_interval_rate: self.prediction_interval_rate,
            acceptable_error: self.acceptable_error,
            initial_segments: self.initial_segments,
            dimension: self.dimension,
            sizes: self.sizes(),
        }
    }
}

/// Configuration for the standalone critical-value search
///
/// # Example TOML
/// ```toml
/// probability = 0.35
/// degrees_of_freedom = 9
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TRangeConfig {
    /// Target integral of the t-density over `[0, x]`
    pub probability: f64,

    /// Degrees of freedom of the t-distribution
    pub degrees_of_freedom: f64,

    /// Tolerance handed to the integrator and the search
    #[serde(default = "default_acceptable_error")]
    pub acceptable_error: f64,

    /// Initial Simpson segment count
    #[serde(default = "default_initial_segments")]
    pub initial_segments: usize,
}

impl Default for TRangeConfig {
    fn default() -> Self {
        Self {
            probability: 0.35,       // one tail of a 70% interval
            degrees_of_freedom: 9.0,
            acceptable_error: default_acceptable_error(),
            initial_segments: default_initial_segments(),
        }
    }
}

impl TRangeConfig {
    /// Load and validate a configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = read_toml(path)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.probability > 0.0 && self.probability < 0.5) {
            return Err(format!(
                "probability must be in (0, 0.5), got {}",
                self.probability
            ));
        }

        if !(self.degrees_of_freedom.is_finite() && self.degrees_of_freedom > 0.0) {
            return Err(format!(
                "degrees_of_freedom must be positive, got {}",
                self.degrees_of_freedom
            ));
        }

        validate_tolerance(self.acceptable_error, self.initial_segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_config() -> EstimationConfig {
        EstimationConfig {
            history_file: PathBuf::from("history.tsv"),
            dimension: 4,
            prediction_interval_rate: 0.70,
            acceptable_error: 0.00001,
            initial_segments: 10,
            added_size: 650.0,
            reused_size: 3000.0,
            modified_size: 155.0,
        }
    }

    #[test]
    fn test_sample_config_is_valid() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_defaults_fill_optional_keys() {
        let config: EstimationConfig = toml::from_str(
            r#"
            history_file = "history.tsv"
            added_size = 650.0
            reused_size = 3000.0
            modified_size = 155.0
            "#,
        )
        .unwrap();
        assert_eq!(config, sample_config());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let parsed: std::result::Result<EstimationConfig, _> = toml::from_str(
            r#"
            history_file = "h.tsv"
            added_size = 1.0
            reused_size = 1.0
            modified_size = 1.0
            confidence = 0.9
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_invalid_rate() {
        let mut config = sample_config();
        config.prediction_interval_rate = 1.0;
        assert!(config.validate().is_err());
        config.prediction_interval_rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_dimension() {
        let mut config = sample_config();
        config.dimension = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_segments_and_error() {
        let mut config = sample_config();
        config.initial_segments = 7;
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.acceptable_error = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parameters_carry_sizes() {
        let params = sample_config().parameters();
        assert_eq!(params.sizes, ProxySizes::new(650.0, 3000.0, 155.0));
        assert_eq!(params.initial_segments, 10);
        assert_eq!(params.dimension, 4);
    }

    #[test]
    fn test_from_toml_resolves_history_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "history_file = \"data/history.tsv\"\nadded_size = 1.0\nreused_size = 2.0\nmodified_size = 3.0"
        )
        .unwrap();

        let config = EstimationConfig::from_toml(&path).unwrap();
        assert_eq!(config.history_file, dir.path().join("data/history.tsv"));
    }

    #[test]
    fn test_from_toml_missing_file() {
        let err = EstimationConfig::from_toml("/nonexistent/probe.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_t_range_defaults_valid() {
        assert!(TRangeConfig::default().validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_t_range_rejects_bad_values() {
        let mut config = TRangeConfig::default();
        config.probability = 0.5;
        assert!(config.validate().is_err());

        let mut config = TRangeConfig::default();
        config.degrees_of_freedom = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_t_range_integer_degrees_of_freedom_parse() {
        let config: TRangeConfig = toml::from_str("probability = 0.45\ndegrees_of_freedom = 15").unwrap();
        assert_eq!(config.degrees_of_freedom, 15.0);
    }
}
