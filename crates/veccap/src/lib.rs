//! Runtime capability configuration for vector search engines.
//!
//! This is the umbrella crate. It re-exports [`veccap_core`] and forwards
//! its feature flags:
//!
//! - `disk-index`: async I/O context pool
//! - `accelerator`: accelerator resource manager
//! - `accelerator-clustering`: accelerator clustering memory pool
//! - `cuda`: CUDA device backend (implies `accelerator`)
//! - `serde`: serializable configuration
//!
//! # Example
//!
//! ```
//! use veccap::prelude::*;
//!
//! CapabilityConfigurator::report_version();
//! CapabilityConfigurator::select_simd_tier(CapabilityTier::Auto);
//! CapabilityConfigurator::set_blas_threshold(16384);
//! ```

pub use veccap_core::*;

pub use tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use veccap_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reexports_reach_core() {
        let ctx = RuntimeCapabilityContext::new();
        ctx.set_blas_threshold(64);
        assert_eq!(ctx.blas_threshold(), 64);
        assert_eq!(
            build_features().disk_index,
            cfg!(feature = "disk-index")
        );
    }
}
