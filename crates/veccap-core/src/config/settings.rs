//! Declarative configuration surface.
//!
//! A [`CapabilityConfig`] collects every option a host may set. Unset
//! options leave the corresponding state alone. Applying a configuration
//! never validates it; [`CapabilityConfig::validate`] is available for
//! hosts that want the stricter contract.

use crate::context::RuntimeCapabilityContext;
use crate::core::error::{CapabilityError, Result};
use crate::core::types::{CapabilityTier, ClusteringStrategy};
use crate::resources::MemPoolSize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accelerator device selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcceleratorConfig {
    pub device_id: i64,
    pub resource_count: i64,
}

/// Every host-settable capability option.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CapabilityConfig {
    pub simd_tier: Option<CapabilityTier>,
    pub blas_threshold: Option<i64>,
    pub early_stop_threshold: Option<f64>,
    pub clustering_strategy: Option<ClusteringStrategy>,
    pub build_threads: Option<usize>,
    pub search_threads: Option<usize>,
    pub async_io_contexts: Option<usize>,
    pub accelerator: Option<AcceleratorConfig>,
    pub accelerator_mem_pool: Option<MemPoolSize>,
}

/// What [`CapabilityConfig::apply`] observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Kernel path bound, when a tier was requested.
    pub bound_kernels: Option<String>,
    /// Async I/O init result, when contexts were requested.
    pub async_io_ready: Option<bool>,
    pub build_threads: Option<usize>,
    pub search_threads: Option<usize>,
}

impl CapabilityConfig {
    /// Start an empty configuration.
    pub fn builder() -> CapabilityConfigBuilder {
        CapabilityConfigBuilder::new()
    }

    /// Apply every set option to `ctx`.
    ///
    /// Order: SIMD tier, thresholds, clustering, thread pools, async I/O,
    /// accelerator resources, accelerator memory pool. Stops at the first
    /// accelerator error; earlier options stay applied.
    pub fn apply(&self, ctx: &RuntimeCapabilityContext) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        if let Some(tier) = self.simd_tier {
            report.bound_kernels = Some(ctx.select_simd_tier(tier));
        }
        if let Some(threshold) = self.blas_threshold {
            ctx.set_blas_threshold(threshold);
        }
        if let Some(threshold) = self.early_stop_threshold {
            ctx.set_early_stop_threshold(threshold);
        }
        if let Some(strategy) = self.clustering_strategy {
            ctx.set_clustering_strategy(strategy);
        }
        if let Some(threads) = self.build_threads {
            report.build_threads = Some(ctx.init_build_thread_pool(threads));
        }
        if let Some(threads) = self.search_threads {
            report.search_threads = Some(ctx.init_search_thread_pool(threads));
        }
        if let Some(contexts) = self.async_io_contexts {
            report.async_io_ready = Some(ctx.init_async_io_pool(contexts));
        }
        if let Some(accel) = self.accelerator {
            ctx.init_accelerator_resources(accel.device_id, accel.resource_count)?;
        }
        if let Some(pool) = self.accelerator_mem_pool {
            ctx.set_accelerator_mem_pool(pool.init_size, pool.max_size);
        }

        Ok(report)
    }

    /// Strict validation, never performed implicitly.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.blas_threshold {
            if threshold < 0 {
                return Err(CapabilityError::invalid_configuration(
                    "must be non-negative",
                    "blas_threshold",
                    threshold,
                ));
            }
        }
        if let Some(threshold) = self.early_stop_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(CapabilityError::invalid_configuration(
                    "must be a fraction in [0, 1]",
                    "early_stop_threshold",
                    threshold,
                ));
            }
        }
        for (name, threads) in [
            ("build_threads", self.build_threads),
            ("search_threads", self.search_threads),
            ("async_io_contexts", self.async_io_contexts),
        ] {
            if threads == Some(0) {
                return Err(CapabilityError::invalid_configuration(
                    "must be greater than 0",
                    name,
                    0,
                ));
            }
        }
        if let Some(accel) = self.accelerator {
            if accel.device_id < 0 {
                return Err(CapabilityError::invalid_configuration(
                    "must be non-negative",
                    "accelerator.device_id",
                    accel.device_id,
                ));
            }
            if accel.resource_count < 0 {
                return Err(CapabilityError::invalid_configuration(
                    "must be non-negative",
                    "accelerator.resource_count",
                    accel.resource_count,
                ));
            }
        }
        if let Some(pool) = self.accelerator_mem_pool {
            if pool.init_size > pool.max_size {
                return Err(CapabilityError::invalid_configuration(
                    "init_size exceeds max_size",
                    "accelerator_mem_pool",
                    format!("{} > {}", pool.init_size, pool.max_size),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for a [`CapabilityConfig`].
#[derive(Debug, Default)]
pub struct CapabilityConfigBuilder {
    config: CapabilityConfig,
}

impl CapabilityConfigBuilder {
    /// Builder with every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a SIMD tier.
    pub fn simd_tier(mut self, tier: CapabilityTier) -> Self {
        self.config.simd_tier = Some(tier);
        self
    }

    /// Set the BLAS batch threshold.
    pub fn blas_threshold(mut self, threshold: i64) -> Self {
        self.config.blas_threshold = Some(threshold);
        self
    }

    /// Set the early-stop fraction.
    pub fn early_stop_threshold(mut self, threshold: f64) -> Self {
        self.config.early_stop_threshold = Some(threshold);
        self
    }

    /// Select the clustering initialization.
    pub fn clustering_strategy(mut self, strategy: ClusteringStrategy) -> Self {
        self.config.clustering_strategy = Some(strategy);
        self
    }

    /// Size the build worker pool.
    pub fn build_threads(mut self, threads: usize) -> Self {
        self.config.build_threads = Some(threads);
        self
    }

    /// Size the search worker pool.
    pub fn search_threads(mut self, threads: usize) -> Self {
        self.config.search_threads = Some(threads);
        self
    }

    /// Number of async I/O contexts to create.
    pub fn async_io_contexts(mut self, contexts: usize) -> Self {
        self.config.async_io_contexts = Some(contexts);
        self
    }

    /// Accelerator device and resource count.
    pub fn accelerator(mut self, device_id: i64, resource_count: i64) -> Self {
        self.config.accelerator = Some(AcceleratorConfig {
            device_id,
            resource_count,
        });
        self
    }

    /// Accelerator memory pool bounds in bytes.
    pub fn accelerator_mem_pool(mut self, init_size: usize, max_size: usize) -> Self {
        self.config.accelerator_mem_pool = Some(MemPoolSize {
            init_size,
            max_size,
        });
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> CapabilityConfig {
        self.config
    }
}
