//! Prometheus metrics for provider failover observability.
//!
//! Exposes metrics compatible with Prometheus/OpenMetrics format:
//! - `relaymux_provider_connection_state{provider}` - Gauge of each provider's connection state
//! - `relaymux_active_tier` - Gauge of the active provider's tier (0 when none)
//! - `relaymux_reconnect_attempts_total{provider}` - Counter of provider start attempts
//! - `relaymux_reconnect_successes_total{provider}` - Counter of provider activations
//! - `relaymux_switches_total{kind}` - Counter of active-provider switches by cause
//! - `relaymux_balancer_sends_total{provider,status}` - Counter of balanced send outcomes
//! - `relaymux_uptime_seconds` - Gauge of time since metrics were initialized
//!
//! The failover controller reports through the [`MetricsSink`] trait so tests and
//! embedders can swap the Prometheus recorder for their own collector.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use relaymux_types::models::{ConnectionState, SwitchKind};
use std::sync::OnceLock;
use std::time::Instant;

/// Global Prometheus handle for rendering metrics
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global start time for uptime calculation
static METRICS_START_TIME: OnceLock<Instant> = OnceLock::new();

/// Counters and gauges emitted by the failover controller at activation,
/// failover and promotion points.
pub trait MetricsSink: Send + Sync {
    fn set_connection_state(&self, provider: &str, state: ConnectionState);

    /// `0` when no provider is active.
    fn set_active_tier(&self, tier: i32);

    fn record_reconnect_attempt(&self, provider: &str);

    fn record_reconnect_success(&self, provider: &str);

    fn record_switch(&self, kind: SwitchKind);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn set_connection_state(&self, _provider: &str, _state: ConnectionState) {}

    fn set_active_tier(&self, _tier: i32) {}

    fn record_reconnect_attempt(&self, _provider: &str) {}

    fn record_reconnect_success(&self, _provider: &str) {}

    fn record_switch(&self, _kind: SwitchKind) {}
}

/// Forwards to the global `metrics` recorder installed by [`init_metrics`].
///
/// Calls are no-ops until a recorder is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetrics;

impl MetricsSink for PrometheusMetrics {
    fn set_connection_state(&self, provider: &str, state: ConnectionState) {
        let labels = [("provider", provider.to_string())];
        gauge!("relaymux_provider_connection_state", &labels).set(state.gauge_value());
    }

    fn set_active_tier(&self, tier: i32) {
        gauge!("relaymux_active_tier").set(f64::from(tier));
    }

    fn record_reconnect_attempt(&self, provider: &str) {
        let labels = [("provider", provider.to_string())];
        counter!("relaymux_reconnect_attempts_total", &labels).increment(1);
    }

    fn record_reconnect_success(&self, provider: &str) {
        let labels = [("provider", provider.to_string())];
        counter!("relaymux_reconnect_successes_total", &labels).increment(1);
    }

    fn record_switch(&self, kind: SwitchKind) {
        let labels = [("kind", kind.to_string())];
        counter!("relaymux_switches_total", &labels).increment(1);
    }
}

/// Initialize the Prometheus metrics recorder.
/// Call once at startup before any metrics are recorded; later calls return
/// the existing handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let _ = METRICS_START_TIME.get_or_init(Instant::now);

    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_gauge!(
        "relaymux_provider_connection_state",
        "Provider connection state (0=disconnected 1=connecting 2=logging_in 3=logged_in 4=reconnecting 5=failed)"
    );
    describe_gauge!("relaymux_active_tier", "Tier of the active provider, 0 when none");
    describe_counter!("relaymux_reconnect_attempts_total", "Total provider start attempts");
    describe_counter!(
        "relaymux_reconnect_successes_total",
        "Total provider activations after a successful start"
    );
    describe_counter!("relaymux_switches_total", "Total active provider switches by cause");
    describe_counter!(
        "relaymux_balancer_sends_total",
        "Total load-balanced send operations by provider and outcome"
    );
    describe_gauge!("relaymux_uptime_seconds", "Seconds since metrics were initialized");

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Record the outcome of one load-balanced send.
pub fn record_balancer_send(provider: &str, ok: bool) {
    let labels = [
        ("provider", provider.to_string()),
        ("status", if ok { "ok" } else { "error" }.to_string()),
    ];
    counter!("relaymux_balancer_sends_total", &labels).increment(1);
}

/// Update uptime gauge.
pub fn update_uptime_gauge() {
    if let Some(start) = METRICS_START_TIME.get() {
        gauge!("relaymux_uptime_seconds").set(start.elapsed().as_secs_f64());
    }
}

/// Render all metrics in Prometheus text format.
pub fn render_metrics() -> String {
    update_uptime_gauge();

    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        handle.render()
    } else {
        String::from("# Metrics not initialized\n")
    }
}
