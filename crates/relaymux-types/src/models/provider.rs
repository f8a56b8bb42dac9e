//! Provider-facing models: session state, init config, and message envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Connection / login state reported by a provider session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    /// Transport is up, waiting for login (QR scan, token exchange)
    LoggingIn,
    /// Connected and logged in. The only state considered healthy.
    LoggedIn,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn is_logged_in(self) -> bool {
        self == Self::LoggedIn
    }

    /// Stable numeric value for gauges.
    pub fn gauge_value(self) -> f64 {
        match self {
            Self::Disconnected => 0.0,
            Self::Connecting => 1.0,
            Self::LoggingIn => 2.0,
            Self::LoggedIn => 3.0,
            Self::Reconnecting => 4.0,
            Self::Failed => 5.0,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::LoggingIn => write!(f, "logging_in"),
            Self::LoggedIn => write!(f, "logged_in"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Initialization config handed to a provider before it is started.
///
/// The core never reads `options`; they belong to the concrete provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Working directory for session files (device keys, login cache)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Provider-specific settings
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ProviderConfig {
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Kind of an inbound event, as labelled by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    #[default]
    Text,
    Image,
    File,
    Revoke,
    System,
}

/// Inbound message envelope passed to the message handler uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Provider that received the event
    pub provider: String,
    pub chat_id: String,
    pub sender: String,
    pub kind: InboundKind,
    /// Raw provider payload
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

/// Media attachment for image and file sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMedia {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl OutboundMedia {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime_type: mime_type.into(), data }
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Provider that delivered the message
    pub provider: String,
    /// Provider-assigned message id, usable for revocation
    pub message_id: String,
}
