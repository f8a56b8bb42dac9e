//! Load balancer configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::BalancerStrategy;

/// Load balancer settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
pub struct BalancerConfig {
    /// Run providers side by side through the balancer instead of
    /// one-active-at-a-time failover
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub strategy: BalancerStrategy,
}
