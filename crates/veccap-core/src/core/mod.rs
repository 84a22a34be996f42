//! Core types and errors.

pub mod error;
pub mod types;

pub use error::{CapabilityError, Result};
pub use types::{CapabilityTier, ClusteringStrategy};
