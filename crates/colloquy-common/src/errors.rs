use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("path error: {0}")]
    PathError(String),
}

/// Failures of the durable conversation store.
///
/// A store error never means a partial write: either the record was fully
/// replaced or the previous one is still intact.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("store query failed: {0}")]
    Query(String),

    #[error("failed to encode history: {0}")]
    Encode(String),

    #[error("stored history for conversation {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ColloquyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ai error: {0}")]
    Ai(String),

    #[error("{0}")]
    Other(String),
}
