//! Failover controller configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use super::default_true;

/// Timing and threshold settings for the failover controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct FailoverConfig {
    /// Run the health/recovery loop. When off, the first provider that starts
    /// stays active until an operator forces a switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between health checks of the active provider
    #[validate(range(min = 1_u64, max = 3600_u64))]
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
    /// Consecutive unhealthy checks before failing over
    #[validate(range(min = 1_u32, max = 100_u32))]
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds between promotion probes of higher-priority providers
    #[validate(range(min = 1_u64, max = 86_400_u64))]
    #[serde(default = "default_recovery_check_interval")]
    pub recovery_check_interval_seconds: u64,
    /// Consecutive healthy probes before promoting a provider back
    #[validate(range(min = 1_u32, max = 100_u32))]
    #[serde(default = "default_recovery_threshold")]
    pub recovery_threshold: u32,
    /// Upper bound for a recovery probe's start call
    #[validate(range(min = 1_u64, max = 600_u64))]
    #[serde(default = "default_probe_start_timeout")]
    pub probe_start_timeout_seconds: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            health_check_interval_seconds: default_health_check_interval(),
            failure_threshold: default_failure_threshold(),
            recovery_check_interval_seconds: default_recovery_check_interval(),
            recovery_threshold: default_recovery_threshold(),
            probe_start_timeout_seconds: default_probe_start_timeout(),
        }
    }
}

impl FailoverConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }

    pub fn recovery_check_interval(&self) -> Duration {
        Duration::from_secs(self.recovery_check_interval_seconds)
    }

    pub fn probe_start_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_start_timeout_seconds)
    }
}

const fn default_health_check_interval() -> u64 {
    30
}

const fn default_failure_threshold() -> u32 {
    3
}

const fn default_recovery_check_interval() -> u64 {
    300 // 5 minutes
}

const fn default_recovery_threshold() -> u32 {
    3
}

const fn default_probe_start_timeout() -> u64 {
    10
}
