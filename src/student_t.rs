//! Student's t-distribution density
//!
//! `f(x) = C · (1 + x²/ν)^(−(ν+1)/2)` with
//! `C = Γ((ν+1)/2) / (√(νπ) · Γ(ν/2))`, evaluated as a difference of log
//! gammas so both Γ values may exceed `f64::MAX` (ν ≳ 343).

use crate::error::{EstimationError, Result};
use crate::gamma::ln_gamma;
use std::f64::consts::PI;

/// A real function of one real variable, the integrand seen by the integrator
pub trait UnaryFunction {
    fn apply(&self, x: f64) -> f64;
}

impl<F> UnaryFunction for F
where
    F: Fn(f64) -> f64,
{
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

/// t-distribution density for a fixed number of degrees of freedom
///
/// The coefficient and exponent depend only on ν and are computed once, at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentT {
    degrees_of_freedom: f64,
    coefficient: f64,
    exponent: f64,
}

impl StudentT {
    /// # Errors
    /// `InvalidArgument` unless `degrees_of_freedom` is finite and positive.
    pub fn new(degrees_of_freedom: f64) -> Result<Self> {
        if !(degrees_of_freedom.is_finite() && degrees_of_freedom > 0.0) {
            return Err(EstimationError::InvalidArgument(format!(
                "degrees of freedom must be positive, got {degrees_of_freedom}"
            )));
        }
        let ln_ratio =
            ln_gamma((degrees_of_freedom + 1.0) / 2.0) - ln_gamma(degrees_of_freedom / 2.0);
        Ok(Self {
            degrees_of_freedom,
            coefficient: ln_ratio.exp() / (degrees_of_freedom * PI).sqrt(),
            exponent: -(degrees_of_freedom + 1.0) / 2.0,
        })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }
}

impl UnaryFunction for StudentT {
    fn apply(&self, x: f64) -> f64 {
        let base = 1.0 + x.powi(2) / self.degrees_of_freedom;
        self.coefficient * base.powf(self.exponent)
    }
}
