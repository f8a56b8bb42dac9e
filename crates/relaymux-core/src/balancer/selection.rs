//! Strategy dispatch over the eligible slots.

use dashmap::mapref::entry::Entry;
use relaymux_types::error::{BalancerError, BalancerResult};
use relaymux_types::models::BalancerStrategy;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use super::slot::ProviderSlot;
use super::LoadBalancer;

impl LoadBalancer {
    /// Pick a slot for `routing_key` according to the configured strategy.
    pub(crate) fn select_slot(&self, routing_key: &str) -> BalancerResult<Arc<ProviderSlot>> {
        let eligible: Vec<Arc<ProviderSlot>> =
            self.slots.read().iter().filter(|s| s.is_eligible()).cloned().collect();

        let slot = match self.strategy {
            BalancerStrategy::RoundRobin => self.select_round_robin(&eligible),
            BalancerStrategy::Sticky => self.select_sticky(routing_key, &eligible),
            BalancerStrategy::Primary => eligible.first().cloned(),
        };

        slot.ok_or(BalancerError::NoHealthyProviders { strategy: self.strategy })
    }

    fn select_round_robin(&self, eligible: &[Arc<ProviderSlot>]) -> Option<Arc<ProviderSlot>> {
        if eligible.is_empty() {
            return None;
        }
        let idx = self.rr_counter.fetch_add(1, Ordering::Relaxed) % eligible.len();
        eligible.get(idx).cloned()
    }

    /// Reuse the key's binding while its slot stays eligible, otherwise rebind
    /// to the least-used eligible slot. The shard guard is held from lookup to
    /// insert, so concurrent first selections for a key agree on one slot.
    fn select_sticky(
        &self,
        routing_key: &str,
        eligible: &[Arc<ProviderSlot>],
    ) -> Option<Arc<ProviderSlot>> {
        // min_by_key keeps the first of equal minima, so ties go to scan order
        let least_used = || eligible.iter().min_by_key(|s| s.sent()).cloned();

        match self.sticky.entry(routing_key.to_string()) {
            Entry::Occupied(mut entry) => {
                if let Some(slot) = eligible.iter().find(|s| s.name() == entry.get().as_str()) {
                    return Some(Arc::clone(slot));
                }
                debug!(key = %routing_key, provider = %entry.get(), "Sticky binding no longer eligible");

                let Some(chosen) = least_used() else {
                    entry.remove();
                    return None;
                };
                let old = entry.insert(chosen.name().to_string());
                info!(key = %routing_key, from = %old, to = %chosen.name(), "Sticky binding rebound");
                Some(chosen)
            },
            Entry::Vacant(entry) => {
                let chosen = least_used()?;
                entry.insert(chosen.name().to_string());
                Some(chosen)
            },
        }
    }
}
