pub mod errors;
pub mod id;
pub mod turn;

pub use errors::{ColloquyError, ConfigError, StoreError};
pub use id::{new_correlation_id, new_id, ConversationId};
pub use turn::{Attachment, Role, ToolCallRequest, ToolCallResult, Turn, TurnContent};

pub type Result<T> = std::result::Result<T, ColloquyError>;
