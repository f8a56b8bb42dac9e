//! # relaymux Core
//!
//! Control core of a chat-network bridge that relays traffic through one or
//! more backend session providers.
//!
//! ## Architecture
//!
//! ```text
//! relaymux-core/src/
//! ├── provider/   # Provider + MessageHandler contracts, explicit registry
//! ├── failover/   # Tiered single-active controller, health + recovery loop
//! ├── balancer/   # Multi-active load balancer (round-robin/sticky/primary)
//! ├── metrics.rs  # MetricsSink trait + Prometheus exporter
//! ├── config.rs   # JSON config file loading/saving
//! └── logger.rs   # tracing subscriber setup
//! ```
//!
//! A bridge normally uses the [`FailoverController`]: it owns every provider,
//! keeps exactly one of them active, and calls back whenever the active one
//! changes. Deployments that run several providers live at once use the
//! [`LoadBalancer`] instead.

#![allow(
    clippy::significant_drop_tightening,
    reason = "Pool mutex is held across provider lifecycle calls"
)]
// Test-only lints: allow panic!, unwrap, etc. in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::assertions_on_result_states
    )
)]

pub mod balancer;
pub mod config;
pub mod failover;
pub mod logger;
pub mod metrics;
pub mod provider;

#[cfg(test)]
pub(crate) mod tests;

// Re-export commonly used types
pub use balancer::LoadBalancer;
pub use config::{load_config, load_config_from_dir, save_config};
pub use failover::{FailoverController, FailoverHistory, SwitchCallback, MAX_FAILOVER_HISTORY};
pub use logger::init_logging;
pub use crate::metrics::{MetricsSink, NoopMetrics, PrometheusMetrics};
pub use provider::{MessageHandler, NoopMessageHandler, Provider, ProviderRegistry};
