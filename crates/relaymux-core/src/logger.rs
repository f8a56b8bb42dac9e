//! Tracing subscriber bootstrap for bridge binaries.

use std::env;
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor `RELAYMUX_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global fmt subscriber.
///
/// Filter precedence: `RUST_LOG`, then `RELAYMUX_LOG`, then `default_filter`.
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_filter: &str) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(filter_from_env(default_filter))
        .try_init()
}

fn filter_from_env(default_filter: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if let Some(filter) = env::var("RELAYMUX_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
    {
        return filter;
    }

    EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
