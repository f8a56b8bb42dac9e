//! Top-level bridge configuration and provider entries.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{default_true, BalancerConfig, FailoverConfig};
use crate::models::ProviderConfig;

/// One configured provider instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProviderEntry {
    /// Registry key selecting the provider implementation
    #[validate(length(min = 1_u64))]
    pub kind: String,
    /// Instance name; defaults to `kind`
    #[serde(default)]
    pub name: Option<String>,
    /// Priority rank, lower wins
    #[serde(default)]
    pub tier: i32,
    /// Skip this entry without removing it from the file
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub config: ProviderConfig,
}

impl ProviderEntry {
    pub fn new(kind: impl Into<String>, tier: i32) -> Self {
        Self { kind: kind.into(), name: None, tier, enabled: true, config: ProviderConfig::default() }
    }

    /// Effective instance name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}

/// Complete control-core configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BridgeConfig {
    #[serde(default)]
    #[validate(nested)]
    pub failover: FailoverConfig,
    #[serde(default)]
    #[validate(nested)]
    pub balancer: BalancerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub providers: Vec<ProviderEntry>,
}

impl BridgeConfig {
    /// Enabled provider entries in file order.
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderEntry> {
        self.providers.iter().filter(|p| p.enabled)
    }
}
