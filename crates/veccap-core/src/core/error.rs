//! Error types for capability and resource configuration.
//!
//! Most configuration calls are fail-open and never produce an error. The
//! variants below cover the few places where a failure has to reach the
//! host: resource acquisition, misuse of the accelerator state machine and
//! the opt-in strict validation of a [`CapabilityConfig`].
//!
//! [`CapabilityConfig`]: crate::config::CapabilityConfig

use thiserror::Error;

/// Errors that can occur while configuring process-wide capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// An argument is outside the range an operation can act on.
    #[error("Invalid argument `{parameter}` = {value}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        parameter: String,
        /// Value that was rejected
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A configuration failed strict validation.
    ///
    /// Only produced by [`CapabilityConfig::validate`]; applying a
    /// configuration never validates.
    ///
    /// [`CapabilityConfig::validate`]: crate::config::CapabilityConfig::validate
    #[error("Invalid configuration for `{parameter}` = {value}: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// An operation was called in a state that does not allow it.
    #[error("Invalid state: {reason}")]
    InvalidState {
        /// Description of the state violation
        reason: String,
    },

    /// A collaborator failed to acquire a resource.
    #[error("Failed to acquire {resource}: {reason}")]
    ResourceAcquisition {
        /// Kind of resource being acquired
        resource: String,
        /// Collaborator-provided failure description
        reason: String,
    },
}

impl CapabilityError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument<S1, S2, S3>(parameter: S1, value: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
        S3: Into<String>,
    {
        Self::InvalidArgument {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: std::fmt::Display,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an InvalidState error.
    pub fn invalid_state<S: Into<String>>(reason: S) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Create a ResourceAcquisition error.
    pub fn resource_acquisition<S1, S2>(resource: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
    {
        Self::ResourceAcquisition {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for capability operations.
pub type Result<T> = std::result::Result<T, CapabilityError>;
