//! Per-provider bookkeeping inside the failover pool.

use chrono::{DateTime, Utc};
use relaymux_types::models::{ProviderConfig, ProviderStateSnapshot};
use std::sync::Arc;

use crate::provider::Provider;

/// Sentinel name reported when nothing is active.
pub(crate) const NO_PROVIDER: &str = "none";

pub(crate) struct ProviderState {
    pub(crate) provider: Arc<dyn Provider>,
    /// Sort key, captured at registration
    pub(crate) tier: i32,
    pub(crate) config: ProviderConfig,
    pub(crate) initialized: bool,
    pub(crate) active: bool,
    pub(crate) consecutive_failures: u32,
    pub(crate) consecutive_successes: u32,
    pub(crate) total_checks: u64,
    pub(crate) total_failures: u64,
    pub(crate) failover_count: u64,
    pub(crate) last_check: Option<DateTime<Utc>>,
    pub(crate) last_failure: Option<DateTime<Utc>>,
    pub(crate) last_success: Option<DateTime<Utc>>,
}

impl ProviderState {
    pub(crate) fn new(provider: Arc<dyn Provider>, config: ProviderConfig) -> Self {
        Self {
            tier: provider.tier(),
            provider,
            config,
            initialized: false,
            active: false,
            consecutive_failures: 0,
            consecutive_successes: 0,
            total_checks: 0,
            total_failures: 0,
            failover_count: 0,
            last_check: None,
            last_failure: None,
            last_success: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.provider.name()
    }

    pub(crate) fn record_success(&mut self, now: DateTime<Utc>) {
        self.total_checks += 1;
        self.last_check = Some(now);
        self.last_success = Some(now);
        self.consecutive_failures = 0;
        self.consecutive_successes += 1;
    }

    pub(crate) fn record_failure(&mut self, now: DateTime<Utc>) {
        self.total_checks += 1;
        self.total_failures += 1;
        self.last_check = Some(now);
        self.last_failure = Some(now);
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
    }

    pub(crate) fn snapshot(&self) -> ProviderStateSnapshot {
        ProviderStateSnapshot {
            name: self.name().to_string(),
            tier: self.tier,
            active: self.active,
            running: self.provider.is_running(),
            connection_state: self.provider.connection_state(),
            consecutive_failures: self.consecutive_failures,
            consecutive_successes: self.consecutive_successes,
            total_checks: self.total_checks,
            total_failures: self.total_failures,
            failover_count: self.failover_count,
            last_check: self.last_check,
            last_failure: self.last_failure,
            last_success: self.last_success,
        }
    }
}

/// Everything guarded by the controller's state lock.
#[derive(Default)]
pub(crate) struct Pool {
    /// Ascending by tier; equal tiers keep registration order
    pub(crate) states: Vec<ProviderState>,
    pub(crate) active: Option<usize>,
    pub(crate) running: bool,
}

impl Pool {
    pub(crate) fn insert(&mut self, state: ProviderState) {
        self.states.push(state);
        // stable: equal tiers stay in registration order
        self.states.sort_by_key(|s| s.tier);
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name() == name)
    }

    /// Name and tier of the active provider, or the `"none"`/0 sentinel.
    pub(crate) fn active_label(&self) -> (String, i32) {
        self.active
            .and_then(|idx| self.states.get(idx))
            .map_or_else(|| (NO_PROVIDER.to_string(), 0), |s| (s.name().to_string(), s.tier))
    }

    pub(crate) fn has_candidate_after(&self, idx: usize) -> bool {
        self.states.iter().skip(idx + 1).any(|s| s.initialized)
    }
}
