//! Failover controller: registration, lifecycle, reads and forced switches.

use chrono::Utc;
use parking_lot::{Mutex as SyncMutex, RwLock};
use relaymux_types::error::{ConfigError, FailoverError, FailoverResult};
use relaymux_types::models::{
    BridgeConfig, FailoverConfig, FailoverEvent, ProviderConfig, ProviderStateSnapshot,
    SwitchKind, SwitchNotice,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::history::FailoverHistory;
use super::state::{Pool, ProviderState, NO_PROVIDER};
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::provider::{MessageHandler, Provider, ProviderRegistry};

/// Invoked synchronously with the new active provider after every failover,
/// promotion, or forced switch.
pub type SwitchCallback = Arc<dyn Fn(Arc<dyn Provider>) + Send + Sync>;

const SWITCH_CHANNEL_CAPACITY: usize = 32;

/// Floor for monitor tick periods; `interval_at` rejects a zero period.
const MIN_TICK: Duration = Duration::from_secs(1);

#[derive(Clone)]
struct ActiveView {
    provider: Arc<dyn Provider>,
    tier: i32,
}

/// Owns the provider pool and keeps exactly one provider active.
pub struct FailoverController {
    pub(super) config: FailoverConfig,
    /// Pool, active index and counters. Held across provider start/stop so
    /// transitions never interleave.
    pub(super) pool: Mutex<Pool>,
    /// Published copy of the active provider, updated inside the critical section
    active_view: RwLock<Option<ActiveView>>,
    pub(super) history: FailoverHistory,
    handler: Arc<dyn MessageHandler>,
    pub(super) metrics: Arc<dyn MetricsSink>,
    on_switch: RwLock<Option<SwitchCallback>>,
    switch_tx: broadcast::Sender<SwitchNotice>,
    /// Shutdown signal for the monitor task
    shutdown_tx: SyncMutex<Option<watch::Sender<bool>>>,
}

impl FailoverController {
    /// Create a controller with no metrics sink.
    pub fn new(config: FailoverConfig, handler: Arc<dyn MessageHandler>) -> Arc<Self> {
        Self::with_metrics(config, handler, Arc::new(NoopMetrics))
    }

    pub fn with_metrics(
        config: FailoverConfig,
        handler: Arc<dyn MessageHandler>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Arc<Self> {
        Self::build(config, handler, metrics, Pool::default())
    }

    /// Build every enabled provider entry through `registry` and register it.
    pub fn from_config(
        config: &BridgeConfig,
        registry: &ProviderRegistry,
        handler: Arc<dyn MessageHandler>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Arc<Self>, ConfigError> {
        let mut pool = Pool::default();

        for entry in config.enabled_providers() {
            let provider = registry.build(entry)?;
            if pool.index_of(provider.name()).is_some() {
                return Err(ConfigError::ValidationError {
                    field: "providers".to_string(),
                    message: format!("duplicate provider name '{}'", provider.name()),
                });
            }
            debug!(provider = %provider.name(), kind = %entry.kind, tier = provider.tier(), "Registered provider from config");
            pool.insert(ProviderState::new(provider, entry.config.clone()));
        }

        info!(providers = pool.states.len(), "Failover controller built from config");
        Ok(Self::build(config.failover, handler, metrics, pool))
    }

    fn build(
        config: FailoverConfig,
        handler: Arc<dyn MessageHandler>,
        metrics: Arc<dyn MetricsSink>,
        pool: Pool,
    ) -> Arc<Self> {
        let (switch_tx, _) = broadcast::channel(SWITCH_CHANNEL_CAPACITY);

        Arc::new(Self {
            config,
            pool: Mutex::new(pool),
            active_view: RwLock::new(None),
            history: FailoverHistory::new(),
            handler,
            metrics,
            on_switch: RwLock::new(None),
            switch_tx,
            shutdown_tx: SyncMutex::new(None),
        })
    }

    pub fn config(&self) -> &FailoverConfig {
        &self.config
    }

    /// Register a provider. Must happen before [`start`](Self::start).
    pub async fn add_provider(
        &self,
        provider: Arc<dyn Provider>,
        config: ProviderConfig,
    ) -> FailoverResult<()> {
        let mut pool = self.pool.lock().await;

        if pool.running {
            return Err(FailoverError::configuration(format!(
                "cannot register {} while the controller is running",
                provider.name()
            )));
        }
        if pool.index_of(provider.name()).is_some() {
            return Err(FailoverError::configuration(format!(
                "provider {} is already registered",
                provider.name()
            )));
        }

        debug!(provider = %provider.name(), tier = provider.tier(), "Provider registered");
        pool.insert(ProviderState::new(provider, config));
        Ok(())
    }

    /// Replace the switch callback.
    pub fn set_switch_callback<F>(&self, callback: F)
    where
        F: Fn(Arc<dyn Provider>) + Send + Sync + 'static,
    {
        *self.on_switch.write() = Some(Arc::new(callback));
    }

    /// Receive a [`SwitchNotice`] for every failover, promotion, or forced switch.
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchNotice> {
        self.switch_tx.subscribe()
    }

    /// Initialize all providers and activate the highest-priority one that starts.
    pub async fn start(self: &Arc<Self>) -> FailoverResult<()> {
        let mut pool = self.pool.lock().await;

        if pool.running {
            debug!("Failover controller already running");
            return Ok(());
        }
        if pool.states.is_empty() {
            return Err(FailoverError::configuration("no providers registered"));
        }

        for state in pool.states.iter_mut().filter(|s| !s.initialized) {
            match state.provider.initialize(&state.config, Arc::clone(&self.handler)).await {
                Ok(()) => state.initialized = true,
                Err(e) => {
                    error!(provider = %state.name(), error = %e, "Provider initialization failed, excluding from pool");
                },
            }
        }

        let mut attempted = 0;
        for idx in 0..pool.states.len() {
            if !pool.states[idx].initialized {
                continue;
            }
            attempted += 1;

            let provider = Arc::clone(&pool.states[idx].provider);
            self.metrics.record_reconnect_attempt(provider.name());
            match provider.start().await {
                Ok(()) => {
                    self.activate(&mut pool, idx);
                    pool.states[idx].consecutive_successes = 1;
                    pool.running = true;
                    info!(
                        provider = %provider.name(),
                        tier = pool.states[idx].tier,
                        "🚀 Failover controller started"
                    );
                    if self.config.enabled {
                        self.spawn_monitor();
                    }
                    return Ok(());
                },
                Err(e) => {
                    warn!(provider = %provider.name(), error = %e, "Provider failed to start, trying next");
                },
            }
        }

        error!(attempted, "No provider could be started");
        Err(FailoverError::AllCandidatesExhausted { attempted })
    }

    /// Stop the monitor task and the active provider.
    pub async fn stop(&self) -> FailoverResult<()> {
        self.signal_shutdown();

        let mut pool = self.pool.lock().await;
        if !pool.running {
            return Ok(());
        }
        pool.running = false;

        let Some(idx) = pool.active else {
            info!("Failover controller stopped (no active provider)");
            return Ok(());
        };

        let provider = Arc::clone(&pool.states[idx].provider);
        self.deactivate(&mut pool, idx);
        let result = provider.stop().await;
        self.metrics.set_connection_state(provider.name(), provider.connection_state());

        info!(provider = %provider.name(), "Failover controller stopped");
        result.map_err(|e| {
            warn!(provider = %provider.name(), error = %e, "Active provider failed to stop cleanly");
            FailoverError::from(e)
        })
    }

    pub async fn is_running(&self) -> bool {
        self.pool.lock().await.running
    }

    /// The active provider, if any.
    pub fn active(&self) -> Option<Arc<dyn Provider>> {
        self.active_view.read().as_ref().map(|v| Arc::clone(&v.provider))
    }

    /// Name of the active provider, or `"none"`.
    pub fn active_name(&self) -> String {
        self.active_view
            .read()
            .as_ref()
            .map_or_else(|| NO_PROVIDER.to_string(), |v| v.provider.name().to_string())
    }

    /// Tier of the active provider, or `0`.
    pub fn active_tier(&self) -> i32 {
        self.active_view.read().as_ref().map_or(0, |v| v.tier)
    }

    /// Snapshot of every provider's bookkeeping, in tier order.
    pub async fn provider_states(&self) -> Vec<ProviderStateSnapshot> {
        let pool = self.pool.lock().await;
        pool.states.iter().map(ProviderState::snapshot).collect()
    }

    /// Snapshot of the failover audit trail, oldest first.
    pub fn failover_history(&self) -> Vec<FailoverEvent> {
        self.history.snapshot()
    }

    /// Fail over away from the active provider right now.
    pub async fn force_failover(&self) -> FailoverResult<()> {
        let mut pool = self.pool.lock().await;

        let Some(idx) = pool.active else {
            return Err(FailoverError::no_target("no active provider"));
        };
        if !pool.has_candidate_after(idx) {
            return Err(FailoverError::no_target(format!(
                "no lower-priority provider after {}",
                pool.states[idx].name()
            )));
        }

        info!(provider = %pool.states[idx].name(), "Manual failover requested");
        if self.fail_over(&mut pool, idx, "manual failover requested".to_string(), SwitchKind::Forced).await {
            Ok(())
        } else {
            Err(FailoverError::no_target("no lower-priority provider could be started"))
        }
    }

    /// Switch to `name`. The current provider is stopped only after the new
    /// one has started.
    pub async fn force_provider(&self, name: &str) -> FailoverResult<()> {
        let mut pool = self.pool.lock().await;

        let idx = pool
            .index_of(name)
            .ok_or_else(|| FailoverError::ProviderNotFound { name: name.to_string() })?;
        if !pool.running {
            return Err(FailoverError::configuration("controller is not running"));
        }
        if pool.active == Some(idx) {
            debug!(provider = %name, "Forced provider is already active");
            return Ok(());
        }

        let target = Arc::clone(&pool.states[idx].provider);
        if !pool.states[idx].initialized {
            target.initialize(&pool.states[idx].config, Arc::clone(&self.handler)).await?;
            pool.states[idx].initialized = true;
        }

        self.metrics.record_reconnect_attempt(target.name());
        target.start().await?;

        let (from, from_tier) = pool.active_label();
        if let Some(current) = pool.active {
            let previous = Arc::clone(&pool.states[current].provider);
            self.deactivate(&mut pool, current);
            if let Err(e) = previous.stop().await {
                warn!(provider = %previous.name(), error = %e, "Previous provider failed to stop");
            }
            self.metrics.set_connection_state(previous.name(), previous.connection_state());
        }

        self.activate(&mut pool, idx);
        pool.states[idx].consecutive_successes = 1;
        let to_tier = pool.states[idx].tier;

        info!(from = %from, to = %name, "🔀 Forced switch to provider");
        self.record_transition(&from, from_tier, &target, to_tier, "manual switch requested".to_string());
        self.announce(SwitchKind::Forced, &from, &target, to_tier);
        Ok(())
    }

    /// Mark `idx` active and publish it. Counters other than consecutive
    /// failures are left to the caller.
    pub(super) fn activate(&self, pool: &mut Pool, idx: usize) {
        let state = &mut pool.states[idx];
        state.active = true;
        state.consecutive_failures = 0;
        state.last_success = Some(Utc::now());

        let provider = Arc::clone(&state.provider);
        let tier = state.tier;
        pool.active = Some(idx);
        *self.active_view.write() = Some(ActiveView { provider: Arc::clone(&provider), tier });

        self.metrics.set_active_tier(tier);
        self.metrics.set_connection_state(provider.name(), provider.connection_state());
        self.metrics.record_reconnect_success(provider.name());
    }

    /// Clear the active flag. The recovery streak restarts from zero so a
    /// demoted provider has to earn promotion with fresh probes.
    pub(super) fn deactivate(&self, pool: &mut Pool, idx: usize) {
        pool.states[idx].active = false;
        pool.states[idx].consecutive_successes = 0;
        if pool.active == Some(idx) {
            pool.active = None;
            *self.active_view.write() = None;
            self.metrics.set_active_tier(0);
        }
    }

    pub(super) fn record_transition(
        &self,
        from: &str,
        from_tier: i32,
        to: &Arc<dyn Provider>,
        to_tier: i32,
        reason: String,
    ) {
        self.history.record(FailoverEvent {
            timestamp: Utc::now(),
            from: from.to_string(),
            to: to.name().to_string(),
            from_tier,
            to_tier,
            reason,
        });
    }

    /// Notify the callback and subscribers. Runs after the active view is updated.
    pub(super) fn announce(
        &self,
        kind: SwitchKind,
        from: &str,
        provider: &Arc<dyn Provider>,
        to_tier: i32,
    ) {
        self.metrics.record_switch(kind);

        let callback = self.on_switch.read().clone();
        if let Some(callback) = callback {
            callback(Arc::clone(provider));
        }

        // no subscribers is fine
        let _ = self.switch_tx.send(SwitchNotice {
            kind,
            from: from.to_string(),
            to: provider.name().to_string(),
            to_tier,
            at: Utc::now(),
        });
    }

    /// Spawn the health/recovery task. Both timers funnel into the pool mutex.
    fn spawn_monitor(self: &Arc<Self>) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        if let Some(previous) = self.shutdown_tx.lock().replace(shutdown_tx) {
            let _ = previous.send(true);
        }

        let controller = Arc::downgrade(self);
        let health_every = self.config.health_check_interval().max(MIN_TICK);
        let recovery_every = self.config.recovery_check_interval().max(MIN_TICK);

        tokio::spawn(async move {
            let mut health = interval_at(Instant::now() + health_every, health_every);
            health.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut recovery = interval_at(Instant::now() + recovery_every, recovery_every);
            recovery.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = health.tick() => {
                        let Some(controller) = controller.upgrade() else { break };
                        controller.check_health().await;
                    }
                    _ = recovery.tick() => {
                        let Some(controller) = controller.upgrade() else { break };
                        controller.check_recovery().await;
                    }
                }
            }

            info!("Failover monitor task shutting down");
        });
    }

    fn signal_shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(true);
        }
    }
}

impl Drop for FailoverController {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}
