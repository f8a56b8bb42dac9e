//! One provider in the balancer pool, with its own health flag and counters.

use relaymux_types::models::SlotStats;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::provider::Provider;

// Counters are reporting-only; Relaxed ordering is sufficient.

pub(crate) struct ProviderSlot {
    pub(crate) provider: Arc<dyn Provider>,
    /// Operator-controlled, independent of the provider's own state
    healthy: AtomicBool,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl ProviderSlot {
    pub(crate) fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            healthy: AtomicBool::new(true),
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.provider.name()
    }

    /// Selectable only while marked healthy and actually running.
    pub(crate) fn is_eligible(&self) -> bool {
        self.healthy.load(Ordering::Relaxed) && self.provider.is_running()
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    pub(crate) fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub(crate) fn record(&self, ok: bool) {
        if ok {
            self.sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn stats(&self) -> SlotStats {
        SlotStats {
            sent: self.sent(),
            failed: self.failed.load(Ordering::Relaxed),
            healthy: self.healthy.load(Ordering::Relaxed),
        }
    }
}
