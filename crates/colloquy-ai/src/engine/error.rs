use colloquy_common::StoreError;

use crate::AiError;

/// Failures of a user turn.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The model channel failed. Nothing was saved.
    #[error("model channel failed: {0}")]
    Channel(#[from] AiError),
    /// The turn completed but could not be saved.
    #[error("could not save conversation: {0}")]
    Store(#[from] StoreError),
    /// The model kept requesting tools past the round limit. Nothing was saved.
    #[error("model requested tools for more than {limit} rounds")]
    ToolLoopExceeded { limit: u32 },
}
