//! Capability detection and declarative configuration.

pub mod features;
pub mod settings;

// Re-export key items
pub use features::{build_features, cpu_features, BuildFeatures, CpuFeatures};
pub use settings::{AcceleratorConfig, ApplyReport, CapabilityConfig, CapabilityConfigBuilder};
