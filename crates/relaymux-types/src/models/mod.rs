//! Domain models for the bridge control core.

pub mod balancer;
pub mod config;
pub mod health;
pub mod provider;

pub use balancer::{BalancerStrategy, SlotStats};
pub use config::{BalancerConfig, BridgeConfig, FailoverConfig, ProviderEntry};
pub use health::{FailoverEvent, ProviderStateSnapshot, SwitchKind, SwitchNotice};
pub use provider::{
    ConnectionState, InboundEvent, InboundKind, OutboundMedia, ProviderConfig, SendReceipt,
};
