//! Error taxonomy for the estimation engine
//!
//! Every failure is detected where it happens and surfaced immediately.
//! All engine operations are deterministic, so nothing here is retryable.
//! Logarithms of non-positive values are not errors: they show up as
//! NaN/Inf in the result and callers check `is_finite()` when it matters.

use thiserror::Error;

/// Errors produced by the numeric engine and its data providers
#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("Cannot aggregate an empty sequence: {0}")]
    EmptyInput(&'static str),

    #[error("Number of elements does not match: left={left}, right={right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Illegal history data format at line {line}: expected {expected} fields, found {found}")]
    ShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("History columns have different lengths: w={w}, x={x}, y={y}, z={z}")]
    UnevenColumns { w: usize, x: usize, y: usize, z: usize },

    #[error("Matrix is singular or nearly singular (pivot column {pivot})")]
    SingularMatrix { pivot: usize },

    #[error("Invalid number at line {line}: {value:?}")]
    InvalidValue { line: usize, value: String },

    #[error("Not enough history data: {samples} samples leave {degrees_of_freedom} degrees of freedom")]
    InsufficientData {
        samples: usize,
        degrees_of_freedom: i64,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{routine} did not converge within {iterations} iterations")]
    NotConverged {
        routine: &'static str,
        iterations: usize,
    },

    #[error("{routine} produced a non-finite value ({value}) at x={x}")]
    NonFinite {
        routine: &'static str,
        x: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for estimation operations
pub type Result<T> = std::result::Result<T, EstimationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_names_line() {
        let err = EstimationError::ShapeMismatch {
            line: 3,
            expected: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Illegal history data format at line 3: expected 4 fields, found 2"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EstimationError = io.into();
        assert!(matches!(err, EstimationError::Io(_)));
    }
}
