//! Failover controller errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ProviderError;

/// Errors returned synchronously by the failover controller.
///
/// Health-triggered failovers never produce these; they are only observable
/// through provider state, the failover history and metrics.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum FailoverError {
    /// The controller is misconfigured (empty pool, registration while running)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Every candidate provider failed to start
    #[error("All {attempted} provider candidates failed to start")]
    AllCandidatesExhausted { attempted: usize },

    /// Forced switch to a provider that was never registered
    #[error("Provider not found: {name}")]
    ProviderNotFound { name: String },

    /// Forced failover found nothing to fail over to
    #[error("No failover target: {reason}")]
    NoFailoverTarget { reason: String },

    /// Pass-through of a provider's own failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl FailoverError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn no_target(reason: impl Into<String>) -> Self {
        Self::NoFailoverTarget { reason: reason.into() }
    }

    /// The wrapped provider error, if this error came from a provider.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for failover controller operations.
pub type FailoverResult<T> = std::result::Result<T, FailoverError>;
