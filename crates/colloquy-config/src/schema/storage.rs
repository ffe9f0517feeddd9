//! Conversation storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where conversations are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path. `None` means `<data_dir>/colloquy/conversations.db`.
    pub database: Option<PathBuf>,
}
