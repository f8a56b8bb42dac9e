use chrono::Utc;
use parking_lot::Mutex;
use relaymux_types::error::{ConfigError, FailoverError};
use relaymux_types::models::{
    BridgeConfig, FailoverConfig, FailoverEvent, ProviderConfig, ProviderEntry,
    ProviderStateSnapshot, SwitchKind,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::{FailoverController, FailoverHistory, MAX_FAILOVER_HISTORY};
use crate::provider::{NoopMessageHandler, Provider, ProviderRegistry};
use crate::tests::{MockProvider, RecordingMetrics};

/// Monitor disabled so tests drive ticks by hand.
fn manual_config() -> FailoverConfig {
    FailoverConfig {
        enabled: false,
        failure_threshold: 2,
        recovery_threshold: 2,
        ..Default::default()
    }
}

async fn controller_with(
    config: FailoverConfig,
    providers: &[&Arc<MockProvider>],
) -> Arc<FailoverController> {
    let controller = FailoverController::new(config, Arc::new(NoopMessageHandler));
    for provider in providers {
        let provider: Arc<dyn Provider> = Arc::<MockProvider>::clone(provider);
        controller.add_provider(provider, ProviderConfig::default()).await.unwrap();
    }
    controller
}

async fn state_of(controller: &FailoverController, name: &str) -> ProviderStateSnapshot {
    controller.provider_states().await.into_iter().find(|s| s.name == name).unwrap()
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn test_start_activates_first_startable_provider() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;

    controller.start().await.unwrap();

    assert!(controller.is_running().await);
    assert_eq!(controller.active_name(), "b");
    assert_eq!(controller.active_tier(), 2);
    assert_eq!(controller.active().unwrap().name(), "b");
    assert!(controller.failover_history().is_empty());

    let b_state = state_of(&controller, "b").await;
    assert!(b_state.active);
    assert!(b_state.running);
    assert!(!state_of(&controller, "a").await.active);
}

#[tokio::test]
async fn test_providers_kept_in_tier_order() {
    let c = MockProvider::new("c", 3);
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let d = MockProvider::new("d", 2);
    let controller = controller_with(manual_config(), &[&c, &a, &b, &d]).await;

    let names: Vec<String> =
        controller.provider_states().await.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["a", "b", "d", "c"]);
}

#[tokio::test]
async fn test_start_with_empty_pool() {
    let controller = controller_with(manual_config(), &[]).await;

    let err = controller.start().await.unwrap_err();
    assert!(matches!(err, FailoverError::Configuration { .. }));
    assert!(!controller.is_running().await);
}

#[tokio::test]
async fn test_start_when_every_provider_fails() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::failing("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;

    let err = controller.start().await.unwrap_err();
    assert_eq!(err, FailoverError::AllCandidatesExhausted { attempted: 2 });
    assert!(!controller.is_running().await);
    assert_eq!(controller.active_name(), "none");
    assert_eq!(controller.active_tier(), 0);
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let a = MockProvider::new("a", 1);
    let controller = controller_with(manual_config(), &[&a]).await;

    controller.start().await.unwrap();
    controller.start().await.unwrap();

    assert_eq!(a.starts(), 1);
    assert_eq!(a.init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_initialize_failure_excludes_provider() {
    let a = MockProvider::new("a", 1);
    a.set_fail_init(true);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;

    controller.start().await.unwrap();
    assert_eq!(controller.active_name(), "b");
    assert_eq!(a.starts(), 0);

    controller.check_recovery().await;
    assert_eq!(a.starts(), 0);
}

#[tokio::test]
async fn test_add_provider_rejected_when_duplicate_or_running() {
    let a = MockProvider::new("a", 1);
    let controller = controller_with(manual_config(), &[&a]).await;

    let dup: Arc<dyn Provider> = MockProvider::new("a", 5);
    let err = controller.add_provider(dup, ProviderConfig::default()).await.unwrap_err();
    assert!(matches!(err, FailoverError::Configuration { .. }));

    controller.start().await.unwrap();
    let late: Arc<dyn Provider> = MockProvider::new("late", 2);
    let err = controller.add_provider(late, ProviderConfig::default()).await.unwrap_err();
    assert!(matches!(err, FailoverError::Configuration { .. }));
    assert_eq!(controller.provider_states().await.len(), 1);
}

// ============================================================================
// Health checks and failover
// ============================================================================

#[tokio::test]
async fn test_failover_after_consecutive_failures() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let weak = Arc::downgrade(&controller);
    let seen_in_callback = Arc::clone(&seen);
    controller.set_switch_callback(move |provider| {
        let active = weak.upgrade().map(|c| c.active_name()).unwrap_or_default();
        seen_in_callback.lock().push((provider.name().to_string(), active));
    });

    controller.start().await.unwrap();
    a.set_healthy(false);

    controller.check_health().await;
    assert_eq!(controller.active_name(), "a");
    assert_eq!(state_of(&controller, "a").await.consecutive_failures, 1);

    controller.check_health().await;
    assert_eq!(controller.active_name(), "b");
    assert_eq!(controller.active_tier(), 2);
    assert_eq!(a.stops(), 1);
    assert!(!a.is_running());

    let history = controller.failover_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from, "a");
    assert_eq!(history[0].to, "b");
    assert_eq!(history[0].from_tier, 1);
    assert_eq!(history[0].to_tier, 2);
    assert_eq!(history[0].reason, "health check failed 2 times");

    let a_state = state_of(&controller, "a").await;
    assert_eq!(a_state.failover_count, 1);
    assert!(!a_state.active);
    let b_state = state_of(&controller, "b").await;
    assert_eq!(b_state.consecutive_successes, 1);
    assert_eq!(b_state.consecutive_failures, 0);

    // callback sees the new provider already published as active
    assert_eq!(*seen.lock(), vec![("b".to_string(), "b".to_string())]);
}

#[tokio::test]
async fn test_subscribers_receive_switch_notice() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    let mut rx = controller.subscribe();

    controller.start().await.unwrap();
    assert!(rx.try_recv().is_err(), "initial activation is not a switch");

    a.crash();
    controller.check_health().await;
    controller.check_health().await;

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.kind, SwitchKind::Failover);
    assert_eq!(notice.from, "a");
    assert_eq!(notice.to, "b");
    assert_eq!(notice.to_tier, 2);
}

#[tokio::test]
async fn test_success_resets_failure_streak() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    a.set_healthy(false);
    controller.check_health().await;
    a.set_healthy(true);
    controller.check_health().await;
    a.set_healthy(false);
    controller.check_health().await;

    assert_eq!(controller.active_name(), "a");
    let a_state = state_of(&controller, "a").await;
    assert_eq!(a_state.consecutive_failures, 1);
    assert_eq!(a_state.total_checks, 3);
    assert_eq!(a_state.total_failures, 2);
    assert!(controller.failover_history().is_empty());
    assert_eq!(b.starts(), 0);
}

#[tokio::test]
async fn test_failover_never_moves_up() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::new("b", 2);
    let c = MockProvider::new("c", 3);
    let controller = controller_with(manual_config(), &[&a, &b, &c]).await;
    controller.start().await.unwrap();
    assert_eq!(controller.active_name(), "b");

    a.set_fail_start(false);
    b.set_healthy(false);
    controller.check_health().await;
    controller.check_health().await;

    assert_eq!(controller.active_name(), "c");
    assert_eq!(a.starts(), 1);
}

#[tokio::test]
async fn test_failover_with_no_startable_candidate() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    b.set_fail_start(true);
    a.set_healthy(false);
    controller.check_health().await;
    controller.check_health().await;

    assert_eq!(controller.active_name(), "none");
    assert_eq!(controller.active_tier(), 0);
    assert!(controller.active().is_none());
    assert!(controller.is_running().await);
    assert!(controller.failover_history().is_empty());
    assert_eq!(a.stops(), 1);
    assert_eq!(state_of(&controller, "a").await.failover_count, 1);

    // nothing to check until something recovers
    controller.check_health().await;
    assert_eq!(state_of(&controller, "a").await.total_checks, 2);
}

// ============================================================================
// Recovery
// ============================================================================

#[tokio::test]
async fn test_recovery_requires_consecutive_healthy_probes() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    let mut rx = controller.subscribe();
    controller.start().await.unwrap();
    assert_eq!(controller.active_name(), "b");

    a.set_fail_start(false);
    controller.check_recovery().await;

    assert_eq!(controller.active_name(), "b");
    assert_eq!(a.stops(), 1, "probe instance is stopped below threshold");
    assert!(!a.is_running());
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 1);

    controller.check_recovery().await;

    assert_eq!(controller.active_name(), "a");
    assert_eq!(controller.active_tier(), 1);
    assert!(a.is_running());
    assert!(!b.is_running());
    assert_eq!(b.stops(), 1);

    let last = controller.failover_history().pop().unwrap();
    assert_eq!(last.from, "b");
    assert_eq!(last.to, "a");
    assert_eq!(last.from_tier, 2);
    assert_eq!(last.to_tier, 1);
    assert_eq!(last.reason, "higher-tier provider recovered");

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.kind, SwitchKind::Promotion);
    assert_eq!(notice.to, "a");
}

#[tokio::test]
async fn test_unhealthy_probe_resets_recovery_streak() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    a.set_fail_start(false);
    controller.check_recovery().await;
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 1);

    // starts but never logs in
    a.set_healthy(false);
    controller.check_recovery().await;
    let a_state = state_of(&controller, "a").await;
    assert_eq!(a_state.consecutive_successes, 0);
    assert_eq!(a_state.total_failures, 1);
    assert!(!a.is_running());

    a.set_healthy(true);
    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "b");
    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "a");
}

#[tokio::test]
async fn test_recovery_skipped_when_highest_priority_active() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    controller.check_recovery().await;
    controller.check_recovery().await;

    assert_eq!(b.starts(), 0);
    assert_eq!(controller.active_name(), "a");
    assert!(controller.failover_history().is_empty());
}

#[tokio::test]
async fn test_recovery_from_no_active_provider() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    b.set_fail_start(true);
    a.set_healthy(false);
    controller.check_health().await;
    controller.check_health().await;
    assert_eq!(controller.active_name(), "none");

    // a still starts unhealthy, b comes back
    b.set_fail_start(false);
    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "none");
    controller.check_recovery().await;

    assert_eq!(controller.active_name(), "b");
    let event = controller.failover_history().pop().unwrap();
    assert_eq!(event.from, "none");
    assert_eq!(event.from_tier, 0);
    assert_eq!(event.to, "b");
    assert_eq!(event.to_tier, 2);
}

#[tokio::test]
async fn test_force_failover_requires_fresh_recovery_streak() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();
    controller.check_health().await;
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 2);

    controller.force_failover().await.unwrap();
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 0);

    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "b");
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 1);

    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "a");
}

#[tokio::test]
async fn test_force_provider_requires_fresh_recovery_streak() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();
    controller.check_health().await;

    controller.force_provider("b").await.unwrap();
    assert_eq!(state_of(&controller, "a").await.consecutive_successes, 0);

    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "b");

    controller.check_recovery().await;
    assert_eq!(controller.active_name(), "a");
    assert_eq!(state_of(&controller, "b").await.consecutive_successes, 0);
}

#[tokio::test(start_paused = true)]
async fn test_probe_start_is_bounded_by_timeout() {
    let a = MockProvider::failing("a", 1);
    let b = MockProvider::new("b", 2);
    let config = FailoverConfig { probe_start_timeout_seconds: 10, ..manual_config() };
    let controller = controller_with(config, &[&a, &b]).await;
    controller.start().await.unwrap();

    a.set_fail_start(false);
    a.set_start_delay(Duration::from_secs(60));
    controller.check_recovery().await;

    assert_eq!(controller.active_name(), "b");
    assert!(!a.is_running());
    let a_state = state_of(&controller, "a").await;
    assert_eq!(a_state.consecutive_successes, 0);
    assert_eq!(a_state.total_failures, 1);
}

// ============================================================================
// Forced switches
// ============================================================================

#[tokio::test]
async fn test_force_failover_without_target() {
    let a = MockProvider::new("a", 1);
    let controller = controller_with(manual_config(), &[&a]).await;
    controller.start().await.unwrap();

    let err = controller.force_failover().await.unwrap_err();
    assert!(matches!(err, FailoverError::NoFailoverTarget { .. }));
    assert_eq!(controller.active_name(), "a");
    assert!(a.is_running());
    assert_eq!(a.stops(), 0);
    assert!(controller.failover_history().is_empty());
}

#[tokio::test]
async fn test_force_failover_moves_to_next_provider() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    let mut rx = controller.subscribe();
    controller.start().await.unwrap();

    controller.force_failover().await.unwrap();

    assert_eq!(controller.active_name(), "b");
    assert_eq!(controller.failover_history()[0].reason, "manual failover requested");
    assert_eq!(state_of(&controller, "a").await.failover_count, 1);
    assert_eq!(rx.try_recv().unwrap().kind, SwitchKind::Forced);
}

#[tokio::test]
async fn test_force_provider_unknown_or_not_running() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;

    let err = controller.force_provider("b").await.unwrap_err();
    assert!(matches!(err, FailoverError::Configuration { .. }));

    controller.start().await.unwrap();
    let err = controller.force_provider("x").await.unwrap_err();
    assert_eq!(err, FailoverError::ProviderNotFound { name: "x".to_string() });
    assert_eq!(controller.active_name(), "a");
}

#[tokio::test]
async fn test_force_provider_start_failure_keeps_active() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    b.set_fail_start(true);
    let err = controller.force_provider("b").await.unwrap_err();

    assert_eq!(err.provider_error().unwrap().provider(), "b");
    assert_eq!(controller.active_name(), "a");
    assert!(a.is_running());
    assert_eq!(a.stops(), 0);
    assert!(controller.failover_history().is_empty());
}

#[tokio::test]
async fn test_force_provider_switches_and_is_noop_when_active() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let controller = controller_with(manual_config(), &[&a, &b]).await;
    controller.start().await.unwrap();

    controller.force_provider("b").await.unwrap();
    assert_eq!(controller.active_name(), "b");
    assert_eq!(a.stops(), 1);
    assert!(b.is_running());

    let event = controller.failover_history().pop().unwrap();
    assert_eq!(event.from, "a");
    assert_eq!(event.to, "b");
    assert_eq!(event.reason, "manual switch requested");

    controller.force_provider("b").await.unwrap();
    assert_eq!(controller.failover_history().len(), 1);
    assert_eq!(b.starts(), 1);
}

// ============================================================================
// Stop, history, monitor loop, config wiring
// ============================================================================

#[tokio::test]
async fn test_stop_is_idempotent() {
    let a = MockProvider::new("a", 1);
    let controller = controller_with(manual_config(), &[&a]).await;
    controller.start().await.unwrap();

    controller.stop().await.unwrap();
    assert!(!controller.is_running().await);
    assert!(!a.is_running());
    assert_eq!(controller.active_name(), "none");

    controller.stop().await.unwrap();
    assert_eq!(a.stops(), 1);
}

#[tokio::test]
async fn test_stop_passes_through_provider_error() {
    let a = MockProvider::new("a", 1);
    let controller = controller_with(manual_config(), &[&a]).await;
    controller.start().await.unwrap();

    a.set_fail_stop(true);
    let err = controller.stop().await.unwrap_err();
    assert!(err.provider_error().is_some());
    assert!(!controller.is_running().await);
    assert!(controller.active().is_none());
}

#[test]
fn test_history_evicts_oldest_events() {
    let history = FailoverHistory::new();
    for i in 0..150 {
        history.record(FailoverEvent {
            timestamp: Utc::now(),
            from: "a".to_string(),
            to: "b".to_string(),
            from_tier: 1,
            to_tier: 2,
            reason: format!("event {}", i),
        });
    }

    let events = history.snapshot();
    assert_eq!(events.len(), MAX_FAILOVER_HISTORY);
    assert_eq!(events[0].reason, "event 50");
    assert_eq!(history.last().unwrap().reason, "event 149");
}

#[tokio::test(start_paused = true)]
async fn test_monitor_task_fails_over_and_promotes() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let config = FailoverConfig {
        enabled: true,
        health_check_interval_seconds: 30,
        failure_threshold: 2,
        recovery_check_interval_seconds: 300,
        recovery_threshold: 2,
        probe_start_timeout_seconds: 10,
    };
    let controller = controller_with(config, &[&a, &b]).await;
    controller.start().await.unwrap();

    a.set_healthy(false);
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(controller.active_name(), "b");

    a.set_healthy(true);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(controller.active_name(), "a");

    let reasons: Vec<String> =
        controller.failover_history().into_iter().map(|e| e.reason).collect();
    assert_eq!(reasons, vec!["health check failed 2 times", "higher-tier provider recovered"]);

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_metrics_sink_sees_switches() {
    let a = MockProvider::new("a", 1);
    let b = MockProvider::new("b", 2);
    let metrics = Arc::new(RecordingMetrics::default());
    let controller = FailoverController::with_metrics(
        manual_config(),
        Arc::new(NoopMessageHandler),
        Arc::clone(&metrics) as Arc<dyn crate::metrics::MetricsSink>,
    );
    for provider in [&a, &b] {
        let provider: Arc<dyn Provider> = Arc::<MockProvider>::clone(provider);
        controller.add_provider(provider, ProviderConfig::default()).await.unwrap();
    }

    controller.start().await.unwrap();
    assert_eq!(*metrics.active_tier.lock(), 1);

    controller.force_failover().await.unwrap();
    assert_eq!(*metrics.switches.lock(), vec![SwitchKind::Forced]);
    assert_eq!(*metrics.active_tier.lock(), 2);
    assert_eq!(metrics.successes.load(Ordering::SeqCst), 2);
}

fn mock_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("mock", |entry: &ProviderEntry| {
        let provider: Arc<dyn Provider> = MockProvider::new(entry.display_name(), entry.tier);
        Ok(provider)
    });
    registry
}

fn named_entry(name: &str, tier: i32) -> ProviderEntry {
    let mut entry = ProviderEntry::new("mock", tier);
    entry.name = Some(name.to_string());
    entry
}

#[tokio::test]
async fn test_from_config_builds_enabled_providers() {
    let mut disabled = named_entry("spare", 0);
    disabled.enabled = false;
    let config = BridgeConfig {
        failover: manual_config(),
        providers: vec![named_entry("hook", 2), named_entry("pad", 1), disabled],
        ..Default::default()
    };

    let controller = FailoverController::from_config(
        &config,
        &mock_registry(),
        Arc::new(NoopMessageHandler),
        Arc::new(crate::metrics::NoopMetrics),
    )
    .unwrap();

    let names: Vec<String> =
        controller.provider_states().await.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["pad", "hook"]);

    controller.start().await.unwrap();
    assert_eq!(controller.active_name(), "pad");
}

#[test]
fn test_from_config_rejects_duplicates_and_unknown_kinds() {
    let registry = mock_registry();

    let config = BridgeConfig {
        providers: vec![named_entry("pad", 1), named_entry("pad", 2)],
        ..Default::default()
    };
    let err = FailoverController::from_config(
        &config,
        &registry,
        Arc::new(NoopMessageHandler),
        Arc::new(crate::metrics::NoopMetrics),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "providers"));

    let config =
        BridgeConfig { providers: vec![ProviderEntry::new("web", 1)], ..Default::default() };
    let err = FailoverController::from_config(
        &config,
        &registry,
        Arc::new(NoopMessageHandler),
        Arc::new(crate::metrics::NoopMetrics),
    )
    .err()
    .unwrap();
    assert_eq!(err, ConfigError::UnknownProviderKind { kind: "web".to_string() });
}
