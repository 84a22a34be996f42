//! GPU device backends.
//!
//! # Requirements
//!
//! - CUDA toolkit installed
//! - Enable the `cuda` feature flag
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "cuda")]
//! # {
//! use veccap_core::gpu::cuda::CudaBackend;
//! use veccap_core::resources::{AcceleratorProvider, AcceleratorResourceManager};
//!
//! let manager = AcceleratorResourceManager::new(Box::new(CudaBackend::new()));
//! manager.init_resources(0, 4).unwrap();
//! manager.free_resources();
//! # }
//! ```

#[cfg(feature = "cuda")]
pub mod cuda;
