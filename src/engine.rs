//! Multiple-regression estimation engine
//!
//! Fits `z = b0 + b1·w + b2·x + b3·y` to the history by ordinary least
//! squares, estimates `z` for new proxy sizes and bounds the estimate with a
//! two-sided t-distribution prediction interval.
//!
//! Every derived quantity is a pure function of the history and the
//! parameters, so each one is computed on first access and cached for the
//! lifetime of the engine. One engine serves one estimation request.
//!
//! # Example
//! ```
//! use probe_estimator::dataset::RegressionDataset;
//! use probe_estimator::engine::{EstimationParameters, ProxySizes, RegressionEngine};
//!
//! let history = RegressionDataset::from_rows(&[
//!     [1142.0, 1060.0, 325.0, 201.0],
//!     [863.0, 995.0, 98.0, 98.0],
//!     [1065.0, 3205.0, 23.0, 162.0],
//!     [554.0, 120.0, 0.0, 54.0],
//!     [983.0, 2896.0, 120.0, 138.0],
//!     [256.0, 485.0, 88.0, 61.0],
//! ]);
//! let params = EstimationParameters::new(ProxySizes::new(650.0, 3000.0, 155.0));
//! let engine = RegressionEngine::new(history, params);
//!
//! let result = engine.result()?;
//! assert!((result.estimate - 140.9).abs() < 0.05);
//! # Ok::<(), probe_estimator::error::EstimationError>(())
//! ```

use crate::dataset::{RegressionDataset, HISTORY_FIELDS};
use crate::error::{EstimationError, Result};
use crate::linear_system;
use crate::quantile::{QuantileSearch, QuantileSolution};
use crate::sequence::NumericSequence;
use serde::Serialize;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of fitted parameters: intercept plus three slopes
pub const DIMENSION: usize = HISTORY_FIELDS;

/// The critical-value search runs this many times tighter than the
/// configured acceptable error
pub const SEARCH_TOLERANCE_DIVISOR: f64 = 100.0;

/// Estimated proxy sizes for the new piece of work
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProxySizes {
    pub added: f64,
    pub reused: f64,
    pub modified: f64,
}

impl ProxySizes {
    pub fn new(added: f64, reused: f64, modified: f64) -> Self {
        Self {
            added,
            reused,
            modified,
        }
    }
}

/// Inputs that are configuration rather than history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationParameters {
    /// Two-sided confidence rate of the prediction interval, in (0, 1)
    pub prediction_interval_rate: f64,
    /// Base error tolerance
    pub acceptable_error: f64,
    /// Initial Simpson segment count (even, >= 2)
    pub initial_segments: usize,
    /// Fields per history line handed to the reader
    pub dimension: usize,
    pub sizes: ProxySizes,
}

impl EstimationParameters {
    /// 70% interval, 1e-5 tolerance, 10 initial segments
    pub fn new(sizes: ProxySizes) -> Self {
        Self {
            prediction_interval_rate: 0.70,
            acceptable_error: 0.00001,
            initial_segments: 10,
            dimension: DIMENSION,
            sizes,
        }
    }
}

/// Intercept and three slopes of the fitted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionParameters {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
}

impl RegressionParameters {
    pub fn as_array(&self) -> [f64; DIMENSION] {
        [self.b0, self.b1, self.b2, self.b3]
    }

    /// `b0 + b1·w + b2·x + b3·y`
    pub fn predict(&self, w: f64, x: f64, y: f64) -> f64 {
        self.b0 + w * self.b1 + x * self.b2 + y * self.b3
    }
}

/// Final numbers of one estimation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimationResult {
    pub samples: usize,
    pub parameters: RegressionParameters,
    pub estimate: f64,
    pub half_width: f64,
    pub critical_value: f64,
    pub sigma: f64,
    pub leverage: f64,
}

impl EstimationResult {
    /// Lower prediction bound
    pub fn lower(&self) -> f64 {
        self.estimate - self.half_width
    }

    /// Upper prediction bound
    pub fn upper(&self) -> f64 {
        self.estimate + self.half_width
    }
}

/// Sums and cross-product sums feeding the normal equations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalSums {
    pub n: f64,
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub ww: f64,
    pub wx: f64,
    pub wy: f64,
    pub wz: f64,
    pub xx: f64,
    pub xy: f64,
    pub xz: f64,
    pub yy: f64,
    pub yz: f64,
}

impl NormalSums {
    fn from_dataset(data: &RegressionDataset) -> Result<Self> {
        let product_sum = |a: &NumericSequence, b: &NumericSequence| -> Result<f64> {
            Ok(NumericSequence::product(a, b)?.sum())
        };
        let (w, x, y, z) = (data.w(), data.x(), data.y(), data.z());
        Ok(Self {
            n: data.len() as f64,
            w: w.sum(),
            x: x.sum(),
            y: y.sum(),
            z: z.sum(),
            ww: product_sum(w, w)?,
            wx: product_sum(w, x)?,
            wy: product_sum(w, y)?,
            wz: product_sum(w, z)?,
            xx: product_sum(x, x)?,
            xy: product_sum(x, y)?,
            xz: product_sum(x, z)?,
            yy: product_sum(y, y)?,
            yz: product_sum(y, z)?,
        })
    }

    /// `AᵗA` and `Aᵗz` for the design `(1, w, x, y)`
    pub fn normal_equations(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        let a = vec![
            vec![self.n, self.w, self.x, self.y],
            vec![self.w, self.ww, self.wx, self.wy],
            vec![self.x, self.wx, self.xx, self.xy],
            vec![self.y, self.wy, self.xy, self.yy],
        ];
        let b = vec![self.z, self.wz, self.xz, self.yz];
        (a, b)
    }
}

/// Per-predictor mean and sum of squared deviations
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spread {
    mean: f64,
    squared_deviation: f64,
}

impl Spread {
    fn of(values: &NumericSequence) -> Result<Self> {
        let mean = values.mean()?;
        Ok(Self {
            mean,
            squared_deviation: values.sum_squared_deviation(mean),
        })
    }

    fn leverage(&self, input: f64) -> f64 {
        (input - self.mean).powi(2) / self.squared_deviation
    }
}

/// Regression engine with per-instance memoised intermediates
#[derive(Debug)]
pub struct RegressionEngine {
    params: EstimationParameters,
    history_file: Option<PathBuf>,
    history: OnceCell<RegressionDataset>,
    sums: OnceCell<NormalSums>,
    spreads: OnceCell<[Spread; 3]>,
    coefficients: OnceCell<RegressionParameters>,
    estimate: OnceCell<f64>,
    critical: OnceCell<QuantileSolution>,
    sigma: OnceCell<f64>,
    leverage: OnceCell<f64>,
    half_width: OnceCell<f64>,
}

impl RegressionEngine {
    /// Engine over history that is already in memory
    pub fn new(history: RegressionDataset, params: EstimationParameters) -> Self {
        let engine = Self::empty(params, None);
        let _ = engine.history.set(history);
        engine
    }

    /// Engine that reads `path` the first time history is needed
    pub fn from_history_file<P: AsRef<Path>>(path: P, params: EstimationParameters) -> Self {
        Self::empty(params, Some(path.as_ref().to_path_buf()))
    }

    fn empty(params: EstimationParameters, history_file: Option<PathBuf>) -> Self {
        Self {
            params,
            history_file,
            history: OnceCell::new(),
            sums: OnceCell::new(),
            spreads: OnceCell::new(),
            coefficients: OnceCell::new(),
            estimate: OnceCell::new(),
            critical: OnceCell::new(),
            sigma: OnceCell::new(),
            leverage: OnceCell::new(),
            half_width: OnceCell::new(),
        }
    }

    pub fn params(&self) -> &EstimationParameters {
        &self.params
    }

    pub fn history_file(&self) -> Option<&Path> {
        self.history_file.as_deref()
    }

    /// Historical observations, loaded on first access
    pub fn history(&self) -> Result<&RegressionDataset> {
        memoize(&self.history, || match &self.history_file {
            Some(path) => RegressionDataset::load(path, self.params.dimension),
            None => Ok(RegressionDataset::default()),
        })
    }

    /// Number of historical observations
    pub fn samples(&self) -> Result<usize> {
        Ok(self.history()?.len())
    }

    /// Degrees of freedom left after fitting the model
    ///
    /// # Errors
    /// `InsufficientData` unless there are more samples than parameters.
    pub fn degrees_of_freedom(&self) -> Result<usize> {
        let samples = self.samples()?;
        if samples <= DIMENSION {
            return Err(EstimationError::InsufficientData {
                samples,
                degrees_of_freedom: samples as i64 - DIMENSION as i64,
            });
        }
        Ok(samples - DIMENSION)
    }

    /// Sums and cross-products of the history
    pub fn sums(&self) -> Result<&NormalSums> {
        memoize(&self.sums, || {
            let history = self.history()?;
            if history.is_empty() {
                return Err(EstimationError::EmptyInput("history data"));
            }
            NormalSums::from_dataset(history)
        })
    }

    /// Least-squares coefficients
    ///
    /// # Errors
    /// `EmptyInput` without history, `SingularMatrix` for degenerate history
    /// such as collinear predictors.
    pub fn regression_parameters(&self) -> Result<&RegressionParameters> {
        memoize(&self.coefficients, || {
            let (a, b) = self.sums()?.normal_equations();
            debug!(?a, ?b, "assembled normal equations");
            let solution = linear_system::solve(&a, &b)?;
            let parameters = RegressionParameters {
                b0: solution[0],
                b1: solution[1],
                b2: solution[2],
                b3: solution[3],
            };
            debug!(?parameters, "solved regression parameters");
            Ok(parameters)
        })
    }

    /// Point estimate for the configured proxy sizes
    pub fn estimate(&self) -> Result<f64> {
        memoize(&self.estimate, || {
            let sizes = self.params.sizes;
            Ok(self
                .regression_parameters()?
                .predict(sizes.added, sizes.reused, sizes.modified))
        })
        .copied()
    }

    /// t-distribution critical value for half the interval rate
    pub fn critical_value(&self) -> Result<&QuantileSolution> {
        memoize(&self.critical, || {
            let search = QuantileSearch::new(
                self.params.prediction_interval_rate / 2.0,
                self.degrees_of_freedom()? as f64,
                self.params.acceptable_error / SEARCH_TOLERANCE_DIVISOR,
                self.params.initial_segments,
            )?;
            search.resolve()
        })
    }

    /// Residual standard error of the fit
    pub fn sigma(&self) -> Result<f64> {
        memoize(&self.sigma, || {
            let history = self.history()?;
            let parameters = self.regression_parameters()?;
            let residuals: f64 = history
                .w()
                .iter()
                .zip(history.x())
                .zip(history.y())
                .zip(history.z())
                .map(|(((&w, &x), &y), &z)| (z - parameters.predict(w, x, y)).powi(2))
                .sum();
            Ok((residuals / self.degrees_of_freedom()? as f64).sqrt())
        })
        .copied()
    }

    fn spreads(&self) -> Result<&[Spread; 3]> {
        memoize(&self.spreads, || {
            let history = self.history()?;
            Ok([
                Spread::of(history.w())?,
                Spread::of(history.x())?,
                Spread::of(history.y())?,
            ])
        })
    }

    /// `sqrt(1 + 1/n + Σ (input − mean)² / SS)` over the three predictors
    pub fn leverage_term(&self) -> Result<f64> {
        memoize(&self.leverage, || {
            let n = self.samples()? as f64;
            let sizes = self.params.sizes;
            let [w, x, y] = self.spreads()?;
            let sum = 1.0
                + 1.0 / n
                + w.leverage(sizes.added)
                + x.leverage(sizes.reused)
                + y.leverage(sizes.modified);
            Ok(sum.sqrt())
        })
        .copied()
    }

    /// Prediction-interval half-width: critical value × sigma × leverage term
    pub fn half_width(&self) -> Result<f64> {
        memoize(&self.half_width, || {
            let critical = self.critical_value()?.x;
            let half_width = critical * self.sigma()? * self.leverage_term()?;
            debug!(critical, half_width, "computed prediction interval");
            Ok(half_width)
        })
        .copied()
    }

    /// Everything the report needs, computed (or recalled) in one call
    pub fn result(&self) -> Result<EstimationResult> {
        Ok(EstimationResult {
            samples: self.samples()?,
            parameters: *self.regression_parameters()?,
            estimate: self.estimate()?,
            half_width: self.half_width()?,
            critical_value: self.critical_value()?.x,
            sigma: self.sigma()?,
            leverage: self.leverage_term()?,
        })
    }
}

fn memoize<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}
