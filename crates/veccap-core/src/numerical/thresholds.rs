//! Strategy-switch thresholds read by the distance computations.
//!
//! Two knobs live here:
//!
//! - the **BLAS threshold**: query batches with at least this many vectors
//!   are routed through the matrix-multiply path instead of one-by-one
//!   distance kernels;
//! - the **early-stop threshold**: a fraction used to terminate iterative
//!   refinement early.
//!
//! Neither value is validated. Negative counts and fractions outside
//! `[0, 1]` are stored as given; [`CapabilityConfig::validate`] offers a
//! strict check for hosts that want one.
//!
//! [`CapabilityConfig::validate`]: crate::config::CapabilityConfig::validate

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tracing::info;

/// Default BLAS threshold.
pub const DEFAULT_BLAS_THRESHOLD: i64 = 20;

/// Default early-stop threshold (disabled).
pub const DEFAULT_EARLY_STOP_THRESHOLD: f64 = 0.0;

/// Runtime numeric thresholds.
///
/// Both fields are independent atomics: a reader never observes a torn
/// value, but nothing ties the two fields together.
#[derive(Debug)]
pub struct NumericThresholds {
    blas_threshold: AtomicI64,
    /// `f64` stored by bit pattern
    early_stop_threshold: AtomicU64,
}

impl NumericThresholds {
    pub fn new() -> Self {
        Self::with_values(DEFAULT_BLAS_THRESHOLD, DEFAULT_EARLY_STOP_THRESHOLD)
    }

    pub fn with_values(blas_threshold: i64, early_stop_threshold: f64) -> Self {
        Self {
            blas_threshold: AtomicI64::new(blas_threshold),
            early_stop_threshold: AtomicU64::new(early_stop_threshold.to_bits()),
        }
    }

    pub fn set_blas_threshold(&self, threshold: i64) {
        info!(threshold, "Set distance_compute_blas_threshold");
        self.blas_threshold.store(threshold, Ordering::Relaxed);
    }

    pub fn blas_threshold(&self) -> i64 {
        self.blas_threshold.load(Ordering::Relaxed)
    }

    pub fn set_early_stop_threshold(&self, threshold: f64) {
        info!(threshold, "Set early_stop_threshold");
        self.early_stop_threshold
            .store(threshold.to_bits(), Ordering::Relaxed);
    }

    pub fn early_stop_threshold(&self) -> f64 {
        f64::from_bits(self.early_stop_threshold.load(Ordering::Relaxed))
    }

    /// Whether a batch of `num_queries` vectors should take the BLAS path.
    pub fn should_use_blas(&self, num_queries: usize) -> bool {
        // Batch sizes beyond i64::MAX clear any threshold.
        i64::try_from(num_queries).map_or(true, |n| n >= self.blas_threshold())
    }
}

impl Default for NumericThresholds {
    fn default() -> Self {
        Self::new()
    }
}
