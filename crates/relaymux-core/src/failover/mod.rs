//! Tiered Provider Failover
//!
//! Keeps exactly one provider active and moves traffic between providers as
//! their health changes:
//! - Periodic health checks of the active provider
//! - Failover to the next lower-priority provider after consecutive failures
//! - Periodic probing and promotion of recovered higher-priority providers
//! - Bounded audit trail of every transition
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  FailoverController                                            │
//! │  ├── pool: Mutex<Pool>            (tier-sorted ProviderState)  │
//! │  ├── active_view: RwLock          (lock-free reads of active)  │
//! │  ├── history: FailoverHistory     (own lock, capped at 100)    │
//! │  └── monitor task: health tick + recovery tick → same mutex    │
//! └───────────────────────────────────────────────────────────────┘
//! ```

mod controller;
mod health;
mod history;
mod recovery;
mod state;

#[cfg(test)]
mod tests;

pub use controller::{FailoverController, SwitchCallback};
pub use history::{FailoverHistory, MAX_FAILOVER_HISTORY};
