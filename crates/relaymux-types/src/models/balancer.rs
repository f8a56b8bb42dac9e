//! Load balancer models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic distribution strategy, fixed when the balancer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancerStrategy {
    /// Evenly rotate across all eligible providers
    #[default]
    RoundRobin,
    /// Pin each routing key to one provider while it stays eligible
    Sticky,
    /// Always use the first eligible provider; others are standby
    Primary,
}

impl fmt::Display for BalancerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::RoundRobin => write!(f, "round_robin"),
            Self::Sticky => write!(f, "sticky"),
            Self::Primary => write!(f, "primary"),
        }
    }
}

/// Per-provider counters reported by the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotStats {
    pub sent: u64,
    pub failed: u64,
    pub healthy: bool,
}
