//! The runtime capability context.
//!
//! A [`RuntimeCapabilityContext`] owns every piece of process-wide
//! configuration: kernel flags and the dispatcher that reads them, numeric
//! thresholds, the clustering strategy and the optional resource
//! providers. Hosts normally use the lazily-created [`global`] instance,
//! optionally replacing it once at startup through [`install`]; independent
//! contexts can be built for tests or embedding.
//!
//! No ordering between operations is enforced. Call
//! [`init_accelerator_resources`] before anything that uses the
//! accelerator, and [`free_accelerator_resources`] only once those
//! operations have completed.
//!
//! [`init_accelerator_resources`]: RuntimeCapabilityContext::init_accelerator_resources
//! [`free_accelerator_resources`]: RuntimeCapabilityContext::free_accelerator_resources

use crate::clustering::ClusteringSelector;
use crate::compute::cpu::{BoundKernels, FlagSet, HookDispatcher, KernelDispatcher, KernelFlags};
use crate::core::error::{CapabilityError, Result};
use crate::core::types::{CapabilityTier, ClusteringStrategy};
use crate::numerical::NumericThresholds;
use crate::resources::{
    accelerator, aio, mem_pool, AcceleratorProvider, AcceleratorStatus, AioContextPool,
    AsyncIoProvider, MemPoolProvider, MemPoolSize, PoolKind, ThreadPoolRegistry,
    DEFAULT_MAX_EVENTS,
};
use once_cell::sync::OnceCell;
use rayon::ThreadPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Process-wide capability and resource state.
#[derive(Debug)]
pub struct RuntimeCapabilityContext {
    flags: KernelFlags,
    dispatcher: Box<dyn KernelDispatcher>,
    thresholds: NumericThresholds,
    clustering: ClusteringSelector,
    thread_pools: ThreadPoolRegistry,
    async_io: Box<dyn AsyncIoProvider>,
    accelerator: Box<dyn AcceleratorProvider>,
    mem_pool: Box<dyn MemPoolProvider>,
}

impl RuntimeCapabilityContext {
    /// Context with the providers selected by the enabled features.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a context with injected collaborators.
    pub fn builder() -> RuntimeCapabilityContextBuilder {
        RuntimeCapabilityContextBuilder::new()
    }

    /// Select a SIMD tier and rebind the kernels.
    ///
    /// Returns the name of the kernel path actually bound, which may be
    /// lower than requested when the CPU lacks the instructions.
    pub fn select_simd_tier(&self, tier: CapabilityTier) -> String {
        info!(tier = %tier, "Expect SIMD tier");
        self.flags.apply_tier(tier);
        self.rebind()
    }

    /// Select a SIMD tier from a host integer.
    ///
    /// Unknown values leave the flags untouched; the kernels are still
    /// rebound.
    pub fn select_simd_tier_raw(&self, raw: i32) -> String {
        match CapabilityTier::from_raw(raw) {
            Some(tier) => self.select_simd_tier(tier),
            None => {
                warn!(requested = raw, "Unknown SIMD tier, keeping current flags");
                self.rebind()
            }
        }
    }

    fn rebind(&self) -> String {
        let bound = self.dispatcher.rebind(&self.flags);
        info!(path = %bound, "SIMD kernels bound");
        bound
    }

    /// Current tier flags.
    pub fn kernel_flags(&self) -> FlagSet {
        self.flags.load()
    }

    /// Kernels bound by the last tier selection.
    pub fn kernels(&self) -> BoundKernels {
        self.dispatcher.bound()
    }

    /// Set the batch size from which distances go through BLAS. Not validated.
    pub fn set_blas_threshold(&self, threshold: i64) {
        self.thresholds.set_blas_threshold(threshold);
    }

    /// Current BLAS threshold.
    pub fn blas_threshold(&self) -> i64 {
        self.thresholds.blas_threshold()
    }

    /// Set the early-stop fraction. Not validated.
    pub fn set_early_stop_threshold(&self, threshold: f64) {
        self.thresholds.set_early_stop_threshold(threshold);
    }

    /// Current early-stop fraction.
    pub fn early_stop_threshold(&self) -> f64 {
        self.thresholds.early_stop_threshold()
    }

    /// The threshold store read by distance computations.
    pub fn thresholds(&self) -> &NumericThresholds {
        &self.thresholds
    }

    /// Select the clustering initialization.
    pub fn set_clustering_strategy(&self, strategy: ClusteringStrategy) {
        self.clustering.set(strategy);
    }

    /// Unknown values resolve to k-means.
    pub fn set_clustering_strategy_raw(&self, raw: i32) -> ClusteringStrategy {
        self.clustering.set_raw(raw)
    }

    /// Current clustering strategy.
    pub fn clustering_strategy(&self) -> ClusteringStrategy {
        self.clustering.get()
    }

    /// Create the async I/O context pool.
    ///
    /// Always `true` when the disk engine is absent.
    pub fn init_async_io_pool(&self, num_contexts: usize) -> bool {
        self.async_io.init_pool(num_contexts, DEFAULT_MAX_EVENTS)
    }

    /// Shared async I/O pool, `None` when the disk engine is absent.
    pub fn async_io_pool(&self) -> Option<AioContextPool> {
        self.async_io.pool()
    }

    /// Select `device_id` and create `resource_count` resources on it.
    ///
    /// A no-op returning `Ok` when no accelerator is available.
    pub fn init_accelerator_resources(&self, device_id: i64, resource_count: i64) -> Result<()> {
        self.accelerator.init_resources(device_id, resource_count)
    }

    /// Release accelerator resources. Safe to call at any time.
    pub fn free_accelerator_resources(&self) {
        self.accelerator.free_resources();
    }

    /// Observable accelerator state.
    pub fn accelerator_status(&self) -> AcceleratorStatus {
        self.accelerator.status()
    }

    /// The accelerator provider in use.
    pub fn accelerator(&self) -> &dyn AcceleratorProvider {
        self.accelerator.as_ref()
    }

    /// Configure the accelerator clustering memory pool. Not validated.
    pub fn set_accelerator_mem_pool(&self, init_size: usize, max_size: usize) {
        self.mem_pool.set_pool_size(init_size, max_size);
    }

    /// Configured memory pool sizes, if the provider keeps them.
    pub fn accelerator_mem_pool(&self) -> Option<MemPoolSize> {
        self.mem_pool.pool_size()
    }

    /// Returns the build pool size in effect.
    pub fn init_build_thread_pool(&self, num_threads: usize) -> usize {
        self.thread_pools.init(PoolKind::Build, num_threads)
    }

    /// Returns the search pool size in effect.
    pub fn init_search_thread_pool(&self, num_threads: usize) -> usize {
        self.thread_pools.init(PoolKind::Search, num_threads)
    }

    /// Pool for index builds, created on first use.
    pub fn build_thread_pool(&self) -> Result<Arc<ThreadPool>> {
        self.thread_pools.get(PoolKind::Build)
    }

    /// Pool for searches, created on first use.
    pub fn search_thread_pool(&self) -> Result<Arc<ThreadPool>> {
        self.thread_pools.get(PoolKind::Search)
    }

    /// Both worker pool slots.
    pub fn thread_pools(&self) -> &ThreadPoolRegistry {
        &self.thread_pools
    }
}

impl Default for RuntimeCapabilityContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`RuntimeCapabilityContext`] with injected collaborators.
pub struct RuntimeCapabilityContextBuilder {
    dispatcher: Option<Box<dyn KernelDispatcher>>,
    async_io: Option<Box<dyn AsyncIoProvider>>,
    accelerator: Option<Box<dyn AcceleratorProvider>>,
    mem_pool: Option<Box<dyn MemPoolProvider>>,
    thresholds: NumericThresholds,
}

impl RuntimeCapabilityContextBuilder {
    /// Builder that falls back to the feature-selected defaults.
    pub fn new() -> Self {
        Self {
            dispatcher: None,
            async_io: None,
            accelerator: None,
            mem_pool: None,
            thresholds: NumericThresholds::new(),
        }
    }

    /// Use `dispatcher` instead of [`HookDispatcher`].
    pub fn dispatcher(mut self, dispatcher: Box<dyn KernelDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Use `provider` for async I/O.
    pub fn async_io(mut self, provider: Box<dyn AsyncIoProvider>) -> Self {
        self.async_io = Some(provider);
        self
    }

    /// Use `provider` for accelerator resources.
    pub fn accelerator(mut self, provider: Box<dyn AcceleratorProvider>) -> Self {
        self.accelerator = Some(provider);
        self
    }

    /// Use `provider` for the accelerator memory pool.
    pub fn mem_pool(mut self, provider: Box<dyn MemPoolProvider>) -> Self {
        self.mem_pool = Some(provider);
        self
    }

    /// Start from non-default thresholds.
    pub fn thresholds(mut self, blas_threshold: i64, early_stop_threshold: f64) -> Self {
        self.thresholds = NumericThresholds::with_values(blas_threshold, early_stop_threshold);
        self
    }

    /// Finish the context.
    pub fn build(self) -> RuntimeCapabilityContext {
        RuntimeCapabilityContext {
            flags: KernelFlags::new(),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(|| Box::new(HookDispatcher::new())),
            thresholds: self.thresholds,
            clustering: ClusteringSelector::new(),
            thread_pools: ThreadPoolRegistry::new(),
            async_io: self.async_io.unwrap_or_else(aio::default_provider),
            accelerator: self.accelerator.unwrap_or_else(accelerator::default_provider),
            mem_pool: self.mem_pool.unwrap_or_else(mem_pool::default_provider),
        }
    }
}

impl Default for RuntimeCapabilityContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CONTEXT: OnceCell<RuntimeCapabilityContext> = OnceCell::new();

/// The process-wide context.
///
/// Created with [`RuntimeCapabilityContext::new`] on first access unless
/// one was [`install`]ed before.
pub fn global() -> &'static RuntimeCapabilityContext {
    GLOBAL_CONTEXT.get_or_init(RuntimeCapabilityContext::new)
}

/// Make `ctx` the process-wide context.
///
/// Must run before anything reads [`global`]; afterwards the global is
/// fixed and this returns `InvalidState`.
pub fn install(ctx: RuntimeCapabilityContext) -> Result<()> {
    GLOBAL_CONTEXT.set(ctx).map_err(|_| {
        CapabilityError::invalid_state("global capability context is already initialized")
    })?;
    info!("Installed global capability context");
    Ok(())
}
