//! Platform directories used by Colloquy.

use std::fs;
use std::path::PathBuf;

use colloquy_common::ConfigError;

pub(crate) const APP_NAME: &str = "colloquy";

/// Returns the platform-specific configuration directory.
///
/// - macOS: `~/Library/Application Support/colloquy`
/// - Linux: `$XDG_CONFIG_HOME/colloquy` (defaults to `~/.config/colloquy`)
/// - Windows: `%APPDATA%\colloquy`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| ConfigError::PathError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory.
///
/// - macOS: `~/Library/Application Support/colloquy`
/// - Linux: `$XDG_DATA_HOME/colloquy` (defaults to `~/.local/share/colloquy`)
/// - Windows: `%APPDATA%\colloquy`
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| ConfigError::PathError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path to the main configuration file.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns the default conversation database path.
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("conversations.db"))
}

/// Creates the config and data directories if they do not already exist.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    fs::create_dir_all(config_dir()?).map_err(|e| ConfigError::PathError(e.to_string()))?;
    fs::create_dir_all(data_dir()?).map_err(|e| ConfigError::PathError(e.to_string()))?;
    Ok(())
}
