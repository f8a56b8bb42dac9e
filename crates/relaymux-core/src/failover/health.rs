//! Health evaluation of the active provider and the failover transition.

use chrono::Utc;
use relaymux_types::models::SwitchKind;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::controller::FailoverController;
use super::state::Pool;
use crate::provider::is_healthy;

impl FailoverController {
    /// One health tick. Fails over immediately once the active provider's
    /// consecutive failures reach the threshold.
    pub(crate) async fn check_health(&self) {
        let mut pool = self.pool.lock().await;
        if !pool.running {
            return;
        }
        let Some(idx) = pool.active else {
            debug!("Health check skipped, no active provider");
            return;
        };

        let provider = Arc::clone(&pool.states[idx].provider);
        let healthy = is_healthy(provider.as_ref());
        self.metrics.set_connection_state(provider.name(), provider.connection_state());

        let now = Utc::now();
        let state = &mut pool.states[idx];
        if healthy {
            state.record_success(now);
            debug!(provider = %provider.name(), "Health check passed");
            return;
        }

        state.record_failure(now);
        let failures = state.consecutive_failures;
        warn!(
            provider = %provider.name(),
            failures,
            threshold = self.config.failure_threshold,
            running = provider.is_running(),
            state = %provider.connection_state(),
            "Health check failed"
        );

        if failures >= self.config.failure_threshold {
            let reason = format!("health check failed {} times", failures);
            self.fail_over(&mut pool, idx, reason, SwitchKind::Failover).await;
        }
    }

    /// Stop `failed_idx` and activate the first provider after it that starts.
    ///
    /// Only candidates positioned after the failed one are tried; higher-priority
    /// providers are left to the recovery cadence. Returns `false` when nothing
    /// could be started, leaving the pool with no active provider.
    pub(super) async fn fail_over(
        &self,
        pool: &mut Pool,
        failed_idx: usize,
        reason: String,
        kind: SwitchKind,
    ) -> bool {
        let failed = Arc::clone(&pool.states[failed_idx].provider);
        let from_tier = pool.states[failed_idx].tier;

        if let Err(e) = failed.stop().await {
            warn!(provider = %failed.name(), error = %e, "Failed provider did not stop cleanly");
        }
        self.deactivate(pool, failed_idx);
        pool.states[failed_idx].failover_count += 1;
        self.metrics.set_connection_state(failed.name(), failed.connection_state());

        for idx in (failed_idx + 1)..pool.states.len() {
            if !pool.states[idx].initialized {
                continue;
            }

            let candidate = Arc::clone(&pool.states[idx].provider);
            self.metrics.record_reconnect_attempt(candidate.name());
            if let Err(e) = candidate.start().await {
                warn!(provider = %candidate.name(), error = %e, "Failover candidate failed to start");
                continue;
            }

            self.activate(pool, idx);
            pool.states[idx].consecutive_successes = 1;
            let to_tier = pool.states[idx].tier;

            warn!(
                from = %failed.name(),
                to = %candidate.name(),
                from_tier,
                to_tier,
                reason = %reason,
                "⚠️ Failed over to lower-priority provider"
            );
            self.record_transition(failed.name(), from_tier, &candidate, to_tier, reason);
            self.announce(kind, failed.name(), &candidate, to_tier);
            return true;
        }

        error!(
            from = %failed.name(),
            reason = %reason,
            "⛔ No failover candidate could be started, no provider is active"
        );
        info!("Waiting for a recovery probe or a forced switch");
        false
    }
}
