//! Creating and restoring session handles.

use std::sync::Arc;

use colloquy_common::{ConversationId, StoreError};
use colloquy_store::ConversationStore;
use tracing::info;

use crate::tools::builtin_tools;

use super::handle::SessionHandle;
use super::PLACEHOLDER_TITLE;

/// Hands out session handles bound to one persona and tool set.
pub struct SessionManager {
    store: Arc<dyn ConversationStore>,
    /// Every handle starts as a copy of this one.
    template: SessionHandle,
}

impl SessionManager {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            template: SessionHandle::new().with_tools(builtin_tools()),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.template = self.template.with_system_prompt(prompt);
        self
    }

    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.template = self.template.with_max_tool_rounds(max);
        self
    }

    /// Start a conversation with a fresh id, the placeholder title and an
    /// empty history.
    pub fn start_new(&self) -> (ConversationId, String, SessionHandle) {
        let id = ConversationId::new();
        info!(conversation = %id, "started new conversation");
        (id, PLACEHOLDER_TITLE.to_string(), self.template.clone())
    }

    /// Rebuild a handle from the stored history of `id`.
    ///
    /// An id with no stored record resumes as an empty conversation.
    pub fn resume(&self, id: &ConversationId, title: &str) -> Result<SessionHandle, StoreError> {
        let turns = self.store.load(id)?;
        info!(conversation = %id, title, turns = turns.len(), "resumed conversation");
        Ok(self.template.clone().with_turns(turns))
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }
}
