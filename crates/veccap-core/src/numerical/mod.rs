//! Numeric strategy thresholds.

pub mod thresholds;

pub use thresholds::{NumericThresholds, DEFAULT_BLAS_THRESHOLD, DEFAULT_EARLY_STOP_THRESHOLD};
