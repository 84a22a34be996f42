//! Stateless entry points over the global context.
//!
//! [`CapabilityConfigurator`] is the surface hosts call at startup. Every
//! function forwards to [`context::global`]. A host that needs its own
//! collaborators, such as an accelerator backend, calls
//! [`CapabilityConfigurator::install`] before anything else; use a
//! [`RuntimeCapabilityContext`] directly when an isolated instance is
//! needed.
//!
//! # Example
//!
//! ```
//! use veccap_core::{CapabilityConfigurator, CapabilityTier};
//!
//! CapabilityConfigurator::report_version();
//! let bound = CapabilityConfigurator::select_simd_tier(CapabilityTier::Auto);
//! assert!(!bound.is_empty());
//!
//! CapabilityConfigurator::set_blas_threshold(16384);
//! assert_eq!(CapabilityConfigurator::blas_threshold(), 16384);
//! ```

use crate::config::{ApplyReport, CapabilityConfig};
use crate::context::{self, RuntimeCapabilityContext};
use crate::core::error::Result;
use crate::core::types::{CapabilityTier, ClusteringStrategy};
use crate::resources::{AcceleratorStatus, AioContextPool, MemPoolSize};
use crate::version;
use rayon::ThreadPool;
use std::sync::Arc;

/// Process-wide configuration facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityConfigurator;

impl CapabilityConfigurator {
    /// Replace the global context. Fails once the global has been used.
    pub fn install(ctx: RuntimeCapabilityContext) -> Result<()> {
        context::install(ctx)
    }

    /// Log the build identity.
    pub fn report_version() {
        version::report_version();
    }

    /// Build identity string.
    pub fn version_string() -> String {
        version::version_string()
    }

    /// Select a SIMD tier; returns the bound kernel path name.
    pub fn select_simd_tier(tier: CapabilityTier) -> String {
        context::global().select_simd_tier(tier)
    }

    /// Select a SIMD tier from its raw value. Unknown values are ignored.
    pub fn select_simd_tier_raw(raw: i32) -> String {
        context::global().select_simd_tier_raw(raw)
    }

    /// Set the BLAS batch threshold. Not validated.
    pub fn set_blas_threshold(threshold: i64) {
        context::global().set_blas_threshold(threshold);
    }

    /// Current BLAS threshold.
    pub fn blas_threshold() -> i64 {
        context::global().blas_threshold()
    }

    /// Set the early-stop fraction. Not validated.
    pub fn set_early_stop_threshold(threshold: f64) {
        context::global().set_early_stop_threshold(threshold);
    }

    /// Current early-stop fraction.
    pub fn early_stop_threshold() -> f64 {
        context::global().early_stop_threshold()
    }

    /// Select the clustering initialization.
    pub fn set_clustering_strategy(strategy: ClusteringStrategy) {
        context::global().set_clustering_strategy(strategy);
    }

    /// Unknown values select K-means.
    pub fn set_clustering_strategy_raw(raw: i32) -> ClusteringStrategy {
        context::global().set_clustering_strategy_raw(raw)
    }

    /// Current clustering strategy.
    pub fn clustering_strategy() -> ClusteringStrategy {
        context::global().clustering_strategy()
    }

    /// Create the async I/O context pool. Always `true` without the disk engine.
    pub fn init_async_io_pool(num_contexts: usize) -> bool {
        context::global().init_async_io_pool(num_contexts)
    }

    /// Shared async I/O pool, if any.
    pub fn async_io_pool() -> Option<AioContextPool> {
        context::global().async_io_pool()
    }

    /// Select a device and create its resources.
    pub fn init_accelerator_resources(device_id: i64, resource_count: i64) -> Result<()> {
        context::global().init_accelerator_resources(device_id, resource_count)
    }

    /// Release accelerator resources. Safe at any time.
    pub fn free_accelerator_resources() {
        context::global().free_accelerator_resources();
    }

    /// Observable accelerator state.
    pub fn accelerator_status() -> AcceleratorStatus {
        context::global().accelerator_status()
    }

    /// Configure the accelerator memory pool. Not validated.
    pub fn set_accelerator_mem_pool(init_size: usize, max_size: usize) {
        context::global().set_accelerator_mem_pool(init_size, max_size);
    }

    /// Configured memory pool sizes, if kept.
    pub fn accelerator_mem_pool() -> Option<MemPoolSize> {
        context::global().accelerator_mem_pool()
    }

    /// Set the build pool size once; returns the size in effect.
    pub fn init_build_thread_pool(num_threads: usize) -> usize {
        context::global().init_build_thread_pool(num_threads)
    }

    /// Set the search pool size once; returns the size in effect.
    pub fn init_search_thread_pool(num_threads: usize) -> usize {
        context::global().init_search_thread_pool(num_threads)
    }

    /// Pool for index builds.
    pub fn build_thread_pool() -> Result<Arc<ThreadPool>> {
        context::global().build_thread_pool()
    }

    /// Pool for searches.
    pub fn search_thread_pool() -> Result<Arc<ThreadPool>> {
        context::global().search_thread_pool()
    }

    /// Apply a whole configuration to the global context.
    pub fn apply(config: &CapabilityConfig) -> Result<ApplyReport> {
        config.apply(context::global())
    }
}
