//! Critical-value search for the t-distribution
//!
//! Finds `x*` such that `∫₀^x* t(ν) ≈ p` by stepping a trial bound and
//! halving the step on every change of direction:
//!
//! | direction  | integral vs target | action                                 |
//! |------------|--------------------|----------------------------------------|
//! | increasing | below              | `x += dx`                              |
//! | increasing | at or above        | `dx /= 2; x -= dx`, flip to decreasing |
//! | decreasing | at or below        | `dx /= 2; x += dx`, flip to increasing |
//! | decreasing | above              | `x -= dx`                              |
//!
//! The search stops once `|dx|` drops below a tenth of the tolerance. It
//! relies on the integral being monotonic in the bound, which holds for a
//! probability density.

use crate::error::{EstimationError, Result};
use crate::integrate::AdaptiveIntegrator;
use crate::student_t::StudentT;
use tracing::debug;

/// Upper bound on trial evaluations before giving up
pub const MAX_ITERATIONS: usize = 10_000;

/// Result of a critical-value search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileSolution {
    /// Upper integration bound found by the search
    pub x: f64,
    /// Integral of the density over `[0, x]` at the last trial
    pub achieved: f64,
    /// Number of integrations performed
    pub iterations: usize,
}

/// Search for the bound whose t-density integral from zero equals `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileSearch {
    target: f64,
    distribution: StudentT,
    integrator: AdaptiveIntegrator,
    max_iterations: usize,
}

impl QuantileSearch {
    /// # Errors
    /// `InvalidArgument` when `target` lies outside `(0, 0.5)`, when the
    /// degrees of freedom are not positive, or when the integrator settings
    /// are rejected.
    pub fn new(
        target: f64,
        degrees_of_freedom: f64,
        tolerance: f64,
        initial_segments: usize,
    ) -> Result<Self> {
        if !(target > 0.0 && target < 0.5) {
            return Err(EstimationError::InvalidArgument(format!(
                "target probability must lie in (0, 0.5), got {target}"
            )));
        }
        Ok(Self {
            target,
            distribution: StudentT::new(degrees_of_freedom)?,
            integrator: AdaptiveIntegrator::new(initial_segments, tolerance)?,
            max_iterations: MAX_ITERATIONS,
        })
    }

    /// Override the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn distribution(&self) -> &StudentT {
        &self.distribution
    }

    pub fn tolerance(&self) -> f64 {
        self.integrator.tolerance()
    }

    pub fn initial_segments(&self) -> usize {
        self.integrator.initial_segments()
    }

    /// Run the search
    ///
    /// # Errors
    /// Propagates integrator failures; `NotConverged` when the step has not
    /// decayed within the iteration cap.
    pub fn resolve(&self) -> Result<QuantileSolution> {
        let threshold = self.tolerance() / 10.0;
        let mut trial_x = 1.0;
        let mut delta_x = 1.0_f64;
        let mut increasing = true;
        let mut actual: Option<f64> = None;
        let mut iterations = 0;

        while delta_x.abs() >= threshold {
            if iterations == self.max_iterations {
                return Err(EstimationError::NotConverged {
                    routine: "critical value search",
                    iterations,
                });
            }

            if let Some(actual) = actual {
                match (increasing, actual < self.target) {
                    (true, true) => trial_x += delta_x,
                    (true, false) => {
                        delta_x /= 2.0;
                        trial_x -= delta_x;
                        increasing = false;
                    }
                    (false, _) if actual <= self.target => {
                        delta_x /= 2.0;
                        trial_x += delta_x;
                        increasing = true;
                    }
                    (false, _) => trial_x -= delta_x,
                }
            }

            actual = Some(self.integrator.integrate(&self.distribution, trial_x)?.value);
            iterations += 1;
        }

        let achieved = actual.unwrap_or_default();
        debug!(
            target = self.target,
            x = trial_x,
            achieved,
            iterations,
            "critical value resolved"
        );
        Ok(QuantileSolution {
            x: trial_x,
            achieved,
            iterations,
        })
    }
}
