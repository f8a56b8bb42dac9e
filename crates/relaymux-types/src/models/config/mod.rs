//! Bridge control configuration models.

mod balancer;
mod bridge;
mod failover;

pub use balancer::BalancerConfig;
pub use bridge::{BridgeConfig, ProviderEntry};
pub use failover::FailoverConfig;

pub const fn default_true() -> bool {
    true
}
