//! Explicit provider factory registry.
//!
//! The registry is an ordinary value handed to
//! [`FailoverController::from_config`](crate::FailoverController::from_config);
//! there is no process-wide table.

use relaymux_types::error::ConfigError;
use relaymux_types::models::ProviderEntry;
use std::collections::HashMap;
use std::sync::Arc;

use super::Provider;

/// Builds a provider instance from its config entry.
pub type ProviderFactory =
    Box<dyn Fn(&ProviderEntry) -> Result<Arc<dyn Provider>, String> + Send + Sync>;

/// Maps provider kinds to factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderEntry) -> Result<Arc<dyn Provider>, String> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), Box::new(factory)).is_some() {
            tracing::debug!(kind = %kind, "Replaced provider factory");
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.factories.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn build(&self, entry: &ProviderEntry) -> Result<Arc<dyn Provider>, ConfigError> {
        let factory = self
            .factories
            .get(&entry.kind)
            .ok_or_else(|| ConfigError::UnknownProviderKind { kind: entry.kind.clone() })?;

        factory(entry).map_err(|message| ConfigError::ProviderBuild {
            kind: entry.kind.clone(),
            message,
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry").field("kinds", &self.kinds()).finish()
    }
}
