//! Multi-active Load Balancer
//!
//! Spreads outbound traffic over several providers that run side by side.
//! Unlike the failover controller it never starts or stops providers; it only
//! chooses among the ones that are running and marked healthy.
//!
//! Strategies:
//! - **RoundRobin**: atomic counter over the eligible set
//! - **Sticky**: each routing key (chat id) stays on one provider while it is eligible
//! - **Primary**: first eligible provider in registration order
//!
//! Sticky bindings to removed providers are not purged eagerly; the next
//! selection for that key notices and rebinds.

mod selection;
mod slot;


use dashmap::DashMap;
use parking_lot::RwLock;
use relaymux_types::error::{BalancerError, BalancerResult, ProviderResult};
use relaymux_types::models::{BalancerConfig, BalancerStrategy, OutboundMedia, SendReceipt, SlotStats};
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::record_balancer_send;
use crate::provider::Provider;
use slot::ProviderSlot;

/// Routes sends across a pool of running providers.
pub struct LoadBalancer {
    strategy: BalancerStrategy,
    /// Registration order
    slots: RwLock<Vec<Arc<ProviderSlot>>>,
    rr_counter: AtomicUsize,
    /// routing key -> provider name
    sticky: DashMap<String, String>,
}

impl LoadBalancer {
    pub fn new(strategy: BalancerStrategy) -> Self {
        info!(strategy = %strategy, "Load balancer initialized");
        Self {
            strategy,
            slots: RwLock::new(Vec::new()),
            rr_counter: AtomicUsize::new(0),
            sticky: DashMap::new(),
        }
    }

    pub fn from_config(config: &BalancerConfig) -> Self {
        Self::new(config.strategy)
    }

    pub fn strategy(&self) -> BalancerStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Add a provider, healthy by default. A provider with the same name is
    /// replaced in place and its counters reset.
    pub fn add_provider(&self, provider: Arc<dyn Provider>) {
        let slot = Arc::new(ProviderSlot::new(provider));
        let mut slots = self.slots.write();

        if let Some(existing) = slots.iter_mut().find(|s| s.name() == slot.name()) {
            debug!(provider = %slot.name(), "Replacing balancer provider");
            *existing = slot;
            return;
        }

        debug!(provider = %slot.name(), pool_size = slots.len() + 1, "Provider added to balancer");
        slots.push(slot);
    }

    /// Returns `false` if no provider had that name.
    pub fn remove_provider(&self, name: &str) -> bool {
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|s| s.name() != name);
        let removed = slots.len() != before;
        if removed {
            debug!(provider = %name, "Provider removed from balancer");
        }
        removed
    }

    /// Mark a provider eligible or ineligible. Returns `false` for unknown names.
    pub fn set_healthy(&self, name: &str, healthy: bool) -> bool {
        let slots = self.slots.read();
        let Some(slot) = slots.iter().find(|s| s.name() == name) else {
            return false;
        };
        slot.set_healthy(healthy);
        if !healthy {
            warn!(provider = %name, "Provider marked unhealthy in balancer");
        }
        true
    }

    /// The provider that would serve `routing_key` right now.
    pub fn select_provider(&self, routing_key: &str) -> BalancerResult<Arc<dyn Provider>> {
        self.select_slot(routing_key).map(|slot| Arc::clone(&slot.provider))
    }

    pub async fn send_text(&self, chat_id: &str, text: &str) -> BalancerResult<SendReceipt> {
        let slot = self.select_slot(chat_id)?;
        let result = slot.provider.send_text(chat_id, text).await;
        self.finish(&slot, result)
    }

    pub async fn send_image(
        &self,
        chat_id: &str,
        image: &OutboundMedia,
    ) -> BalancerResult<SendReceipt> {
        let slot = self.select_slot(chat_id)?;
        let result = slot.provider.send_image(chat_id, image).await;
        self.finish(&slot, result)
    }

    pub async fn send_file(&self, chat_id: &str, file: &OutboundMedia) -> BalancerResult<SendReceipt> {
        let slot = self.select_slot(chat_id)?;
        let result = slot.provider.send_file(chat_id, file).await;
        self.finish(&slot, result)
    }

    pub async fn revoke_message(&self, chat_id: &str, message_id: &str) -> BalancerResult<()> {
        let slot = self.select_slot(chat_id)?;
        let result = slot.provider.revoke_message(chat_id, message_id).await;
        self.finish(&slot, result)
    }

    /// Per-provider counters keyed by name.
    pub fn stats(&self) -> HashMap<String, SlotStats> {
        self.slots.read().iter().map(|s| (s.name().to_string(), s.stats())).collect()
    }

    /// Drop every sticky binding.
    pub fn clear_sticky(&self) {
        self.sticky.clear();
    }

    /// Provider name currently bound to `routing_key`, if any.
    pub fn sticky_assignment(&self, routing_key: &str) -> Option<String> {
        self.sticky.get(routing_key).map(|v| v.clone())
    }

    fn finish<T>(&self, slot: &ProviderSlot, result: ProviderResult<T>) -> BalancerResult<T> {
        let ok = result.is_ok();
        slot.record(ok);
        record_balancer_send(slot.name(), ok);

        result.map_err(|e| {
            warn!(provider = %slot.name(), strategy = %self.strategy, error = %e, "Balanced send failed");
            BalancerError::from(e)
        })
    }
}

impl std::fmt::Debug for LoadBalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancer")
            .field("strategy", &self.strategy)
            .field("providers", &self.len())
            .field("sticky_keys", &self.sticky.len())
            .finish()
    }
}
