//! Process-wide capability and resource configuration for vector search.
//!
//! This crate owns the knobs a vector search engine sets once at startup
//! and reads on every hot path: which SIMD kernels are bound, when to
//! switch distance computation to the matrix-multiply path, which
//! clustering initialization to use, and which optional hardware
//! resources (async disk I/O contexts, accelerator devices and their
//! memory pool) are available.
//!
//! # Key Concepts
//!
//! - **Capability tiers**: a requested SIMD level, mapped to an inclusive
//!   prefix of kernel flags and re-resolved against the detected CPU
//! - **Fail-open configuration**: out-of-range values are stored or
//!   mapped to safe defaults instead of failing
//! - **Present/absent providers**: optional subsystems are traits with a
//!   no-op implementation selected when the feature is disabled
//!
//! # Modules
//!
//! - [`clustering`]: Clustering strategy selection
//! - [`compute`]: Distance kernels and SIMD dispatch
//! - [`config`]: CPU detection and declarative configuration
//! - [`configurator`]: Stateless facade over the global context
//! - [`context`]: The runtime capability context
//! - [`core`]: Error and value types
//! - [`gpu`]: Device backends for the accelerator manager
//! - [`numerical`]: Strategy-switch thresholds
//! - [`resources`]: Async I/O, accelerator, memory pool and thread pools
//! - [`version`]: Build identity
//!
//! # Example
//!
//! ```
//! use veccap_core::prelude::*;
//!
//! let ctx = RuntimeCapabilityContext::new();
//! let bound = ctx.select_simd_tier(CapabilityTier::Avx2);
//! assert!(!bound.is_empty());
//!
//! ctx.set_blas_threshold(16384);
//! assert!(ctx.thresholds().should_use_blas(20000));
//! ```

pub mod clustering;
pub mod compute;
pub mod config;
pub mod configurator;
pub mod context;
pub mod core;
pub mod gpu;
pub mod numerical;
pub mod resources;
pub mod utils;
pub mod version;

// Re-export commonly used items at the crate root
pub use crate::configurator::CapabilityConfigurator;
pub use crate::context::{global, install, RuntimeCapabilityContext, RuntimeCapabilityContextBuilder};
pub use crate::core::error::{CapabilityError, Result};
pub use crate::core::types::{CapabilityTier, ClusteringStrategy};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use veccap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clustering::ClusteringSelector;
    pub use crate::compute::cpu::{
        BoundKernels, DistanceFn, FlagSet, HookDispatcher, KernelDispatcher, KernelFlags,
        KernelPath,
    };
    pub use crate::config::{
        build_features, cpu_features, AcceleratorConfig, ApplyReport, BuildFeatures,
        CapabilityConfig, CapabilityConfigBuilder, CpuFeatures,
    };
    pub use crate::configurator::CapabilityConfigurator;
    pub use crate::context::{
        global, install, RuntimeCapabilityContext, RuntimeCapabilityContextBuilder,
    };
    pub use crate::core::error::{CapabilityError, Result};
    pub use crate::core::types::{CapabilityTier, ClusteringStrategy};
    pub use crate::numerical::{
        NumericThresholds, DEFAULT_BLAS_THRESHOLD, DEFAULT_EARLY_STOP_THRESHOLD,
    };
    pub use crate::resources::{
        AcceleratorBackend, AcceleratorMemPool, AcceleratorProvider, AcceleratorResourceManager,
        AcceleratorStatus, AioContext, AioContextPool, AioLease, AioPoolProvider,
        AsyncIoProvider, DeviceResource, MemPoolProvider, MemPoolSize, NoAccelerator,
        NoAsyncIo, NoMemPool, PoolKind, ResourceParams, ThreadPoolRegistry, UnboundBackend,
        DEFAULT_MAX_EVENTS,
    };
    pub use crate::version::{report_version, version_string};
}
