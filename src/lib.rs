//! probe-estimator - regression-based size/effort estimation
//!
//! Fits a three-predictor multiple linear regression to historical project
//! data, projects a new estimate from proxy sizes and bounds it with a
//! two-sided t-distribution prediction interval. The numeric engine (linear
//! solver, gamma approximation, t-density, adaptive Simpson integration and
//! the critical-value search) lives in this library; the binary only wires
//! configuration, history files and output together.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod gamma;
pub mod integrate;
pub mod linear_system;
pub mod quantile;
pub mod report;
pub mod sequence;
pub mod student_t;
