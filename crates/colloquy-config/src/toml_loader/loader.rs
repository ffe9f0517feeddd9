//! Core TOML config loading: read from path or platform default.

use std::path::Path;

use colloquy_common::ConfigError;
use tracing::{info, warn};

use super::template::default_config_toml;
use crate::paths::config_file;
use crate::schema::ColloquyConfig;
use crate::validation;

/// Load config from a specific TOML file path.
///
/// Missing fields take serde defaults. If validation fails, a warning is
/// logged and the parsed config is returned as-is.
pub fn load_from_path(path: &Path) -> Result<ColloquyConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: ColloquyConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}; using parsed config as-is");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path.
///
/// If the file does not exist, creates a default config file and returns defaults.
pub fn load_default() -> Result<ColloquyConfig, ConfigError> {
    let path = config_file()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(ColloquyConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::PathError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::PathError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}
