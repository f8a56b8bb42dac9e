//! Bridge configuration file handling.
//!
//! The config is a single JSON document ([`BridgeConfig`]). A missing file is
//! not an error; defaults are used instead.

use relaymux_types::error::ConfigError;
use relaymux_types::models::BridgeConfig;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use validator::Validate;

/// File name looked up by [`load_config_from_dir`].
pub const CONFIG_FILE: &str = "relaymux.json";

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Load and validate the config at `path`, or return defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(BridgeConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
        message: format!("failed to read {}: {}", path.display(), e),
    })?;
    let config: BridgeConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;

    validate_config(&config)?;
    debug!(path = %path.display(), providers = config.providers.len(), "Config loaded");
    Ok(config)
}

/// Load `relaymux.json` from `dir`.
pub fn load_config_from_dir(dir: &Path) -> Result<BridgeConfig, ConfigError> {
    load_config(&config_path(dir))
}

/// Field ranges plus name uniqueness across enabled providers.
pub fn validate_config(config: &BridgeConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|e| ConfigError::from_validation_errors(&e))?;

    let mut seen = HashSet::new();
    for entry in config.enabled_providers() {
        if !seen.insert(entry.display_name()) {
            return Err(ConfigError::ValidationError {
                field: "providers".to_string(),
                message: format!("duplicate provider name '{}'", entry.display_name()),
            });
        }
    }
    Ok(())
}

/// Validate and write `config` to `path` through a temp file and rename.
pub async fn save_config(path: &Path, config: &BridgeConfig) -> Result<(), ConfigError> {
    validate_config(config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| ConfigError::from_io_error(&e))?;
    }

    let json = serde_json::to_string_pretty(config).map_err(|e| ConfigError::WriteError {
        message: format!("JSON serialize: {}", e),
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await.map_err(|e| ConfigError::from_io_error(&e))?;
    tokio::fs::rename(&temp_path, path).await.map_err(|e| ConfigError::from_io_error(&e))?;

    info!(path = %path.display(), "Config saved");
    Ok(())
}
