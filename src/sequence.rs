//! Ordered numeric sequences with order-independent aggregates
//!
//! Historical observations are held as plain `Vec<f64>` columns. Pairwise
//! operations zip two sequences positionally and refuse to truncate: a
//! length mismatch is an error.

use crate::error::{EstimationError, Result};

/// Ordered, append-only collection of `f64` values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSequence {
    values: Vec<f64>,
}

impl NumericSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// Sum of all values (0.0 for an empty sequence)
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Arithmetic mean
    ///
    /// # Errors
    /// `EmptyInput` when the sequence has no values.
    pub fn mean(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(EstimationError::EmptyInput("mean"));
        }
        Ok(self.sum() / self.values.len() as f64)
    }

    /// Sample standard deviation (divides by `n - 1`)
    ///
    /// # Errors
    /// `EmptyInput` for an empty sequence, `InvalidArgument` for a single value.
    pub fn sample_std_dev(&self) -> Result<f64> {
        let mean = self.mean()?;
        if self.values.len() < 2 {
            return Err(EstimationError::InvalidArgument(format!(
                "sample standard deviation needs at least 2 values, got {}",
                self.values.len()
            )));
        }
        let variance = self.sum_squared_deviation(mean) / (self.values.len() - 1) as f64;
        Ok(variance.sqrt())
    }

    /// Element-wise product `a[i] * b[i]`
    pub fn product(a: &Self, b: &Self) -> Result<Self> {
        Self::zip_with(a, b, |x, y| x * y)
    }

    /// Element-wise quotient `a[i] / b[i]`
    ///
    /// Division by zero is not special-cased; IEEE infinities and NaNs pass through.
    pub fn quotient(a: &Self, b: &Self) -> Result<Self> {
        Self::zip_with(a, b, |x, y| x / y)
    }

    /// Element-wise natural logarithm (NaN/-Inf for non-positive values)
    pub fn ln(&self) -> Self {
        self.values.iter().map(|v| v.ln()).collect()
    }

    /// Σ (v - mean)²
    pub fn sum_squared_deviation(&self, mean: f64) -> f64 {
        self.values.iter().map(|v| (v - mean).powi(2)).sum()
    }

    fn zip_with(a: &Self, b: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if a.len() != b.len() {
            return Err(EstimationError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        Ok(a.iter().zip(b.iter()).map(|(&x, &y)| op(x, y)).collect())
    }
}

impl From<Vec<f64>> for NumericSequence {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<f64> for NumericSequence {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NumericSequence {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
