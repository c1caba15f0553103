//! Historical observations for the regression
//!
//! Each history line holds four tab-separated numbers in column order
//! `w x y z`: three predictors (added, reused and modified size) and the
//! dependent value (actual effort). Blank lines are skipped; any other line
//! with a different field count is rejected.

use crate::error::{EstimationError, Result};
use crate::sequence::NumericSequence;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Field count of a history line: three predictors plus the dependent value
pub const HISTORY_FIELDS: usize = 4;

/// Four parallel columns of equal length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegressionDataset {
    w: NumericSequence,
    x: NumericSequence,
    y: NumericSequence,
    z: NumericSequence,
}

impl RegressionDataset {
    /// Build a dataset from already separated columns
    ///
    /// # Errors
    /// `UnevenColumns` unless all four columns have the same length.
    pub fn from_columns(
        w: NumericSequence,
        x: NumericSequence,
        y: NumericSequence,
        z: NumericSequence,
    ) -> Result<Self> {
        if w.len() != x.len() || w.len() != y.len() || w.len() != z.len() {
            return Err(EstimationError::UnevenColumns {
                w: w.len(),
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(Self { w, x, y, z })
    }

    /// Build a dataset from `(w, x, y, z)` rows
    pub fn from_rows(rows: &[[f64; HISTORY_FIELDS]]) -> Self {
        let mut dataset = Self::default();
        for &[w, x, y, z] in rows {
            dataset.push_row(w, x, y, z);
        }
        dataset
    }

    /// Read tab-separated history from a file
    pub fn load<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let dataset = Self::parse(BufReader::new(file), dimension)?;
        debug!(
            path = %path.as_ref().display(),
            rows = dataset.len(),
            "loaded history data"
        );
        Ok(dataset)
    }

    /// Parse tab-separated history lines
    ///
    /// # Errors
    /// `InvalidArgument` when `dimension` is not [`HISTORY_FIELDS`],
    /// `ShapeMismatch` for a line with the wrong field count,
    /// `InvalidValue` for a field that is not a number.
    pub fn parse<R: BufRead>(reader: R, dimension: usize) -> Result<Self> {
        if dimension != HISTORY_FIELDS {
            return Err(EstimationError::InvalidArgument(format!(
                "history data dimension must be {HISTORY_FIELDS}, got {dimension}"
            )));
        }

        let mut dataset = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != dimension {
                return Err(EstimationError::ShapeMismatch {
                    line: line_number,
                    expected: dimension,
                    found: fields.len(),
                });
            }

            let mut values = [0.0; HISTORY_FIELDS];
            for (slot, field) in values.iter_mut().zip(&fields) {
                *slot = field
                    .trim()
                    .parse()
                    .map_err(|_| EstimationError::InvalidValue {
                        line: line_number,
                        value: field.to_string(),
                    })?;
            }
            let [w, x, y, z] = values;
            dataset.push_row(w, x, y, z);
        }
        Ok(dataset)
    }

    fn push_row(&mut self, w: f64, x: f64, y: f64, z: f64) {
        self.w.push(w);
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }

    /// Number of historical observations
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn w(&self) -> &NumericSequence {
        &self.w
    }

    pub fn x(&self) -> &NumericSequence {
        &self.x
    }

    pub fn y(&self) -> &NumericSequence {
        &self.y
    }

    pub fn z(&self) -> &NumericSequence {
        &self.z
    }
}
