//! Health and audit snapshots exposed by the failover controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ConnectionState;

/// Point-in-time copy of one provider's bookkeeping in the failover pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStateSnapshot {
    pub name: String,
    pub tier: i32,
    pub active: bool,
    pub running: bool,
    pub connection_state: ConnectionState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub total_checks: u64,
    pub total_failures: u64,
    /// How many times this provider has been failed away from
    pub failover_count: u64,
    pub last_check: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

/// Immutable audit record of an active-provider transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverEvent {
    pub timestamp: DateTime<Utc>,
    /// Previous active provider, `"none"` when nothing was active
    pub from: String,
    pub to: String,
    pub from_tier: i32,
    pub to_tier: i32,
    pub reason: String,
}

/// What caused the active provider to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    /// Health checks exceeded the failure threshold
    Failover,
    /// A higher-priority provider passed its recovery probes
    Promotion,
    /// Operator-requested failover or switch
    Forced,
}

impl fmt::Display for SwitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Failover => write!(f, "failover"),
            Self::Promotion => write!(f, "promotion"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

/// Notification broadcast to switch subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchNotice {
    pub kind: SwitchKind,
    pub from: String,
    pub to: String,
    pub to_tier: i32,
    pub at: DateTime<Utc>,
}
