//! Typed error definitions for relaymux.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for health/audit responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

mod balancer;
mod config;
mod failover;
mod provider;

pub use balancer::{BalancerError, BalancerResult};
pub use config::ConfigError;
pub use failover::{FailoverError, FailoverResult};
pub use provider::{ProviderError, ProviderOperation, ProviderResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type that wraps all domain-specific errors.
///
/// Use this when you need a single error type that can represent
/// any relaymux error.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum TypedError {
    /// Wraps a provider operation error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Wraps a failover controller error
    #[error("Failover error: {0}")]
    Failover(#[from] FailoverError),

    /// Wraps a load balancer error
    #[error("Balancer error: {0}")]
    Balancer(#[from] BalancerError),

    /// Wraps a configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Standard Result type using TypedError.
pub type Result<T> = std::result::Result<T, TypedError>;
