//! Result rendering: text, JSON and CSV
//!
//! The text layout mirrors the classic PSP estimation summary: sizes to one
//! decimal place, coefficients to four, the interval rate to two.

use crate::engine::{EstimationResult, ProxySizes, RegressionParameters};
use crate::quantile::QuantileSolution;
use serde::Serialize;
use std::path::Path;

const RULE_HEAVY: &str = "================================================";
const RULE_LIGHT: &str = "------------------------------------------------";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Everything printed for one estimation run
#[derive(Debug, Clone, Serialize)]
pub struct EstimationReport {
    pub configuration_file: String,
    pub history_file: String,
    pub history_count: usize,
    pub sizes: ProxySizes,
    pub parameters: RegressionParameters,
    pub projected: f64,
    pub prediction_interval_rate: f64,
    pub critical_value: f64,
    pub sigma: f64,
    pub leverage: f64,
    pub half_width: f64,
    pub lower_prediction_interval: f64,
    pub upper_prediction_interval: f64,
}

impl EstimationReport {
    pub fn new(
        configuration_file: &Path,
        history_file: &Path,
        sizes: ProxySizes,
        prediction_interval_rate: f64,
        result: &EstimationResult,
    ) -> Self {
        Self {
            configuration_file: file_name(configuration_file),
            history_file: file_name(history_file),
            history_count: result.samples,
            sizes,
            parameters: result.parameters,
            projected: result.estimate,
            prediction_interval_rate,
            critical_value: result.critical_value,
            sigma: result.sigma,
            leverage: result.leverage,
            half_width: result.half_width,
            lower_prediction_interval: result.lower(),
            upper_prediction_interval: result.upper(),
        }
    }

    /// Human-readable summary
    pub fn to_text(&self) -> String {
        let p = &self.parameters;
        let mut out = String::new();
        out.push_str(RULE_HEAVY);
        out.push('\n');
        out.push_str(&format!("Configuration File: {}\n", self.configuration_file));
        out.push_str(&format!("History Data File: {}\n", self.history_file));
        out.push_str(RULE_LIGHT);
        out.push('\n');
        out.push_str(&format!("Number of History Data: {}\n", self.history_count));
        out.push_str("Added, Reused, Modified Code Size:\n");
        out.push_str(&format!(
            "    {:.1}, {:.1}, {:.1}\n",
            self.sizes.added, self.sizes.reused, self.sizes.modified
        ));
        out.push_str("Regression Parameters (B0, B1, B2, B3):\n");
        out.push_str(&format!(
            "    {:.4}, {:.4}, {:.4}, {:.4}\n",
            p.b0, p.b1, p.b2, p.b3
        ));
        out.push_str(&format!("Projected Hours: {:.1}\n", self.projected));
        out.push_str(&format!(
            "Prediction Interval Rate: {:.2}\n",
            self.prediction_interval_rate
        ));
        out.push_str("Prediction Intervals (LPI, UPI):\n");
        out.push_str(&format!(
            "    {:.1}, {:.1}\n",
            self.lower_prediction_interval, self.upper_prediction_interval
        ));
        out.push_str(RULE_HEAVY);
        out.push('\n');
        out
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Header plus one data row
    pub fn to_csv(&self) -> String {
        let p = &self.parameters;
        let header = "history_count,added,reused,modified,b0,b1,b2,b3,projected,rate,\
                      critical_value,sigma,leverage,half_width,lpi,upi";
        let row = [
            self.history_count.to_string(),
            self.sizes.added.to_string(),
            self.sizes.reused.to_string(),
            self.sizes.modified.to_string(),
            p.b0.to_string(),
            p.b1.to_string(),
            p.b2.to_string(),
            p.b3.to_string(),
            self.projected.to_string(),
            self.prediction_interval_rate.to_string(),
            self.critical_value.to_string(),
            self.sigma.to_string(),
            self.leverage.to_string(),
            self.half_width.to_string(),
            self.lower_prediction_interval.to_string(),
            self.upper_prediction_interval.to_string(),
        ]
        .join(",");
        format!("{header}\n{row}\n")
    }
}

/// Outcome of a standalone critical-value search
#[derive(Debug, Clone, Serialize)]
pub struct TRangeReport {
    pub probability: f64,
    pub degrees_of_freedom: f64,
    pub acceptable_error: f64,
    pub x: f64,
    pub achieved: f64,
    pub iterations: usize,
}

impl TRangeReport {
    pub fn new(
        probability: f64,
        degrees_of_freedom: f64,
        acceptable_error: f64,
        solution: &QuantileSolution,
    ) -> Self {
        Self {
            probability,
            degrees_of_freedom,
            acceptable_error,
            x: solution.x,
            achieved: solution.achieved,
            iterations: solution.iterations,
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "{RULE_HEAVY}\n\
             Expected Value (p): {}\n\
             Degrees of Freedom: {}\n\
             Integration Range (x): {:.5}\n\
             Actual Value: {:.5}\n\
             {RULE_HEAVY}\n",
            self.probability, self.degrees_of_freedom, self.x, self.achieved
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        format!(
            "probability,degrees_of_freedom,x,achieved\n{},{},{},{}\n",
            self.probability, self.degrees_of_freedom, self.x, self.achieved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_report() -> EstimationReport {
        let result = EstimationResult {
            samples: 6,
            parameters: RegressionParameters {
                b0: 6.701_336_536_387_54,
                b1: 0.078_366_036_733_867_7,
                b2: 0.015_041_331_199_344_8,
                b3: 0.246_056_332_580_147,
            },
            estimate: 140.901_985_561,
            half_width: 38.849_783_922,
            critical_value: 1.386_206_559_8,
            sigma: 22.650_775_104,
            leverage: 1.237_307_342,
        };
        EstimationReport::new(
            &PathBuf::from("/tmp/conf/probe.toml"),
            &PathBuf::from("/tmp/conf/history.tsv"),
            ProxySizes::new(650.0, 3000.0, 155.0),
            0.70,
            &result,
        )
    }

    #[test]
    fn test_text_layout() {
        let text = sample_report().to_text();
        assert!(text.contains("Configuration File: probe.toml\n"));
        assert!(text.contains("History Data File: history.tsv\n"));
        assert!(text.contains("Number of History Data: 6\n"));
        assert!(text.contains("    650.0, 3000.0, 155.0\n"));
        assert!(text.contains("    6.7013, 0.0784, 0.0150, 0.2461\n"));
        assert!(text.contains("Projected Hours: 140.9\n"));
        assert!(text.contains("Prediction Interval Rate: 0.70\n"));
        assert!(text.contains("    102.1, 179.8\n"));
    }

    #[test]
    fn test_json_round_trips_through_value() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["history_count"], 6);
        assert_eq!(value["sizes"]["reused"], 3000.0);
        assert!(value["parameters"]["b0"].as_f64().unwrap() > 6.7);
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let csv = sample_report().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("history_count,"));
        assert!(lines[1].starts_with("6,650,3000,155,"));

        let header: Vec<&str> = lines[0].split(',').collect();
        let row: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(header.len(), 16);
        assert_eq!(header.len(), row.len());
        let column = |name: &str| {
            let index = header.iter().position(|h| *h == name).unwrap();
            row[index].parse::<f64>().unwrap()
        };
        assert!((column("critical_value") - 1.386_206_559_8).abs() < 1e-9);
        assert!((column("sigma") - 22.650_775_104).abs() < 1e-9);
        assert!((column("leverage") - 1.237_307_342).abs() < 1e-9);
        assert!((column("half_width") - 38.849_783_922).abs() < 1e-9);
    }

    #[test]
    fn test_t_range_text() {
        let solution = QuantileSolution {
            x: 1.099_715_232_849_121,
            achieved: 0.349_999_818_768_210_8,
            iterations: 31,
        };
        let report = TRangeReport::new(0.35, 9.0, 0.00001, &solution);
        let text = report.to_text();
        assert!(text.contains("Integration Range (x): 1.09972\n"));
        assert!(text.contains("Actual Value: 0.35000\n"));
    }
}
