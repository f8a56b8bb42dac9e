//! Provider operation errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle and send operations a provider can fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderOperation {
    Initialize,
    Start,
    Stop,
    SendText,
    SendImage,
    SendFile,
    RevokeMessage,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Initialize => write!(f, "initialize"),
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::SendText => write!(f, "send_text"),
            Self::SendImage => write!(f, "send_image"),
            Self::SendFile => write!(f, "send_file"),
            Self::RevokeMessage => write!(f, "revoke_message"),
        }
    }
}

/// Errors reported by a provider's own lifecycle or send operations.
///
/// The core never interprets these beyond logging; they are passed through to
/// whoever invoked the operation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProviderError {
    /// The provider reported a failure for the operation
    #[error("{provider}: {operation} failed: {message}")]
    OperationFailed { provider: String, operation: ProviderOperation, message: String },

    /// The operation did not complete within the allotted time
    #[error("{provider}: {operation} timed out after {timeout_ms}ms")]
    Timeout { provider: String, operation: ProviderOperation, timeout_ms: u64 },

    /// The provider session is not logged in
    #[error("{provider} is not logged in")]
    NotLoggedIn { provider: String },

    /// The provider does not implement this operation
    #[error("{provider} does not support {operation}")]
    Unsupported { provider: String, operation: ProviderOperation },
}

impl ProviderError {
    pub fn operation_failed(
        provider: impl Into<String>,
        operation: ProviderOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::OperationFailed {
            provider: provider.into(),
            operation,
            message: message.into(),
        }
    }

    /// Name of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::OperationFailed { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::NotLoggedIn { provider }
            | Self::Unsupported { provider, .. } => provider,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
