//! Adaptive composite-Simpson integration over `[0, x]`
//!
//! The segment count doubles until two successive estimates differ by less
//! than the tolerance. No extrapolation is applied; for smooth integrands
//! such as the t-density the error shrinks geometrically with each doubling.
//!
//! # Example
//! ```
//! use probe_estimator::integrate::AdaptiveIntegrator;
//!
//! let integrator = AdaptiveIntegrator::new(10, 1e-9).unwrap();
//! let area = integrator.integrate(&|x: f64| 3.0 * x * x, 2.0).unwrap();
//! assert!((area.value - 8.0).abs() < 1e-9);
//! ```

use crate::error::{EstimationError, Result};
use crate::student_t::UnaryFunction;
use tracing::trace;

/// Upper bound on segment doublings before giving up
pub const MAX_DOUBLINGS: usize = 32;

/// Outcome of an adaptive integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    /// Latest estimate
    pub value: f64,
    /// Estimate from the pass before the latest one
    pub previous: f64,
    /// Segment count used for `value`
    pub segments: usize,
    /// Number of Simpson passes evaluated
    pub passes: usize,
}

/// Segment-doubling Simpson integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveIntegrator {
    initial_segments: usize,
    tolerance: f64,
    max_doublings: usize,
}

impl AdaptiveIntegrator {
    /// # Errors
    /// `InvalidArgument` when `initial_segments` is odd or below 2, or when
    /// `tolerance` is not a positive finite number.
    pub fn new(initial_segments: usize, tolerance: f64) -> Result<Self> {
        validate_segments(initial_segments)?;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(EstimationError::InvalidArgument(format!(
                "tolerance must be positive, got {tolerance}"
            )));
        }
        Ok(Self {
            initial_segments,
            tolerance,
            max_doublings: MAX_DOUBLINGS,
        })
    }

    /// Override the doubling cap
    pub fn with_max_doublings(mut self, max_doublings: usize) -> Self {
        self.max_doublings = max_doublings;
        self
    }

    pub fn initial_segments(&self) -> usize {
        self.initial_segments
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Integrate `f` over `[0, x]`
    ///
    /// # Errors
    /// `InvalidArgument` for a non-finite bound, `NonFinite` as soon as a
    /// Simpson pass yields NaN or ±∞, `NotConverged` when the doubling cap is
    /// reached first.
    pub fn integrate<F>(&self, f: &F, x: f64) -> Result<Integral>
    where
        F: UnaryFunction + ?Sized,
    {
        if !x.is_finite() {
            return Err(EstimationError::InvalidArgument(format!(
                "integration bound must be finite, got {x}"
            )));
        }

        let mut segments = self.initial_segments;
        let mut previous = finite(simpson(f, x, segments), x)?;
        for doubling in 1..=self.max_doublings {
            segments = segments.checked_mul(2).ok_or(EstimationError::NotConverged {
                routine: "adaptive integration",
                iterations: doubling,
            })?;
            let value = finite(simpson(f, x, segments), x)?;
            trace!(x, segments, value, "simpson pass");
            if (value - previous).abs() < self.tolerance {
                return Ok(Integral {
                    value,
                    previous,
                    segments,
                    passes: doubling + 1,
                });
            }
            previous = value;
        }

        Err(EstimationError::NotConverged {
            routine: "adaptive integration",
            iterations: self.max_doublings,
        })
    }
}

/// Integrate `f` over `[0, x]` starting from `segments` and stopping once
/// successive estimates differ by less than `error`
pub fn integrate<F>(f: &F, x: f64, segments: usize, error: f64) -> Result<f64>
where
    F: UnaryFunction + ?Sized,
{
    Ok(AdaptiveIntegrator::new(segments, error)?.integrate(f, x)?.value)
}

/// One composite-Simpson estimate of `∫₀ˣ f` over `segments` equal pieces
///
/// Weights: 1/3 at both ends, 4/3 at odd interior nodes, 2/3 at even ones,
/// all scaled by the step width. `segments` must be even and at least 2.
pub fn simpson<F>(f: &F, x: f64, segments: usize) -> f64
where
    F: UnaryFunction + ?Sized,
{
    debug_assert!(segments >= 2 && segments % 2 == 0);
    let step = x / segments as f64;

    let ends = 1.0 / 3.0 * (f.apply(0.0) + f.apply(x));
    let odd: f64 = (1..segments)
        .step_by(2)
        .map(|i| 4.0 / 3.0 * f.apply(i as f64 * step))
        .sum();
    let even: f64 = (2..segments)
        .step_by(2)
        .map(|i| 2.0 / 3.0 * f.apply(i as f64 * step))
        .sum();

    (ends + odd + even) * step
}

fn finite(value: f64, x: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimationError::NonFinite {
            routine: "adaptive integration",
            x,
            value,
        })
    }
}

fn validate_segments(segments: usize) -> Result<()> {
    if segments < 2 || segments % 2 != 0 {
        return Err(EstimationError::InvalidArgument(format!(
            "segment count must be even and >= 2, got {segments}"
        )));
    }
    Ok(())
}
