//! Recovery probing and promotion of higher-priority providers.

use chrono::Utc;
use relaymux_types::models::SwitchKind;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::controller::FailoverController;
use super::state::Pool;
use crate::provider::is_healthy;

enum ProbeOutcome {
    /// Did not start, or started unhealthy; try the next candidate
    Failed,
    /// Healthy but below the recovery threshold; wait for the next tick
    Pending,
    /// Healthy for `recovery_threshold` consecutive probes and still running
    Recovered,
}

impl FailoverController {
    /// One recovery tick. Probes providers that outrank the active one, in
    /// priority order, and promotes the first that has proven itself.
    pub(crate) async fn check_recovery(&self) {
        let mut pool = self.pool.lock().await;
        if !pool.running {
            return;
        }

        let active_tier = pool.active.map(|idx| pool.states[idx].tier);
        let candidates: Vec<usize> = pool
            .states
            .iter()
            .enumerate()
            .filter(|(idx, s)| {
                s.initialized
                    && pool.active != Some(*idx)
                    && active_tier.is_none_or(|tier| s.tier < tier)
            })
            .map(|(idx, _)| idx)
            .collect();

        if candidates.is_empty() {
            debug!("Recovery check skipped, active provider has the highest priority");
            return;
        }

        for idx in candidates {
            match self.probe(&mut pool, idx).await {
                ProbeOutcome::Failed => continue,
                ProbeOutcome::Pending => return,
                ProbeOutcome::Recovered => {
                    self.promote(&mut pool, idx).await;
                    return;
                },
            }
        }
    }

    /// Start a standby provider under a timeout and test it once.
    ///
    /// The probe instance is stopped again unless it reached the recovery threshold.
    async fn probe(&self, pool: &mut Pool, idx: usize) -> ProbeOutcome {
        let provider = Arc::clone(&pool.states[idx].provider);
        let timeout = self.config.probe_start_timeout();

        self.metrics.record_reconnect_attempt(provider.name());
        let started = match tokio::time::timeout(timeout, provider.start()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(provider = %provider.name(), error = %e, "Recovery probe failed to start");
                false
            },
            Err(_) => {
                debug!(provider = %provider.name(), timeout_secs = timeout.as_secs(), "Recovery probe start timed out");
                false
            },
        };

        let now = Utc::now();
        if !started {
            if provider.is_running() {
                stop_probe(provider.as_ref()).await;
            }
            pool.states[idx].record_failure(now);
            return ProbeOutcome::Failed;
        }

        if !is_healthy(provider.as_ref()) {
            debug!(
                provider = %provider.name(),
                state = %provider.connection_state(),
                "Recovery probe started but is unhealthy"
            );
            stop_probe(provider.as_ref()).await;
            pool.states[idx].record_failure(now);
            return ProbeOutcome::Failed;
        }

        let state = &mut pool.states[idx];
        state.record_success(now);
        let successes = state.consecutive_successes;

        if successes >= self.config.recovery_threshold {
            return ProbeOutcome::Recovered;
        }

        info!(
            provider = %provider.name(),
            successes,
            threshold = self.config.recovery_threshold,
            "🔄 Higher-priority provider healthy, waiting for more probes"
        );
        stop_probe(provider.as_ref()).await;
        ProbeOutcome::Pending
    }

    /// Make the already-running probe instance at `idx` the active provider.
    async fn promote(&self, pool: &mut Pool, idx: usize) {
        let (from, from_tier) = pool.active_label();

        if let Some(current) = pool.active {
            let previous = Arc::clone(&pool.states[current].provider);
            self.deactivate(pool, current);
            if let Err(e) = previous.stop().await {
                warn!(provider = %previous.name(), error = %e, "Demoted provider failed to stop");
            }
            self.metrics.set_connection_state(previous.name(), previous.connection_state());
        }

        let promoted = Arc::clone(&pool.states[idx].provider);
        self.activate(pool, idx);
        let to_tier = pool.states[idx].tier;

        info!(
            from = %from,
            to = %promoted.name(),
            from_tier,
            to_tier,
            "✅ Promoted recovered higher-priority provider"
        );
        self.record_transition(
            &from,
            from_tier,
            &promoted,
            to_tier,
            "higher-tier provider recovered".to_string(),
        );
        self.announce(SwitchKind::Promotion, &from, &promoted, to_tier);
    }
}

async fn stop_probe(provider: &dyn crate::provider::Provider) {
    if let Err(e) = provider.stop().await {
        warn!(provider = %provider.name(), error = %e, "Recovery probe failed to stop");
    }
}
