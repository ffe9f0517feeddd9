//! Durable conversation storage.
//!
//! A conversation is stored as one record: id, title and a text-encoded
//! history of its text turns. Tool-call turns and attachment bytes are not
//! persisted, so a resumed conversation replays only what was said.

pub mod codec;
pub mod sqlite;

use chrono::{DateTime, Utc};
use colloquy_common::{ConversationId, StoreError, Turn};

pub use sqlite::SqliteStore;

/// Listing entry for a stored conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// Keyed storage of conversations.
pub trait ConversationStore: Send + Sync {
    /// Upsert the record for `id`, replacing any previous one in full.
    fn save(&self, id: &ConversationId, title: &str, turns: &[Turn]) -> Result<(), StoreError>;

    /// Every stored conversation, most recently written first.
    fn list_all(&self) -> Result<Vec<ConversationSummary>, StoreError>;

    /// Decoded text turns of a conversation; empty if `id` is unknown.
    fn load(&self, id: &ConversationId) -> Result<Vec<Turn>, StoreError>;

    /// Remove a conversation. Unknown ids are ignored.
    fn delete(&self, id: &ConversationId) -> Result<(), StoreError>;
}
