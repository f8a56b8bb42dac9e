//! Load balancer errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ProviderError;
use crate::models::BalancerStrategy;

/// Errors that can occur while routing through the load balancer.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum BalancerError {
    /// No slot is both marked healthy and running
    #[error("No healthy providers available ({strategy} strategy)")]
    NoHealthyProviders { strategy: BalancerStrategy },

    /// Pass-through of the selected provider's own failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl BalancerError {
    /// The wrapped provider error, if the selected provider failed.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            Self::NoHealthyProviders { .. } => None,
        }
    }
}

/// Result type for load balancer operations.
pub type BalancerResult<T> = std::result::Result<T, BalancerError>;
