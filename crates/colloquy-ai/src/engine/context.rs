//! The conversation the orchestrator is currently working on.

use colloquy_common::{Attachment, ConversationId};

use crate::session::{SessionHandle, PLACEHOLDER_TITLE};

/// Current conversation id, title, active handle and pending attachment.
#[derive(Debug)]
pub struct EngineContext {
    pub(super) conversation_id: ConversationId,
    pub(super) title: String,
    /// Set once the first user turn is recorded, after which the title never changes.
    pub(super) title_frozen: bool,
    pub(super) handle: SessionHandle,
    pub(super) pending_attachment: Option<Attachment>,
}

impl EngineContext {
    pub(super) fn new(conversation_id: ConversationId, title: String, handle: SessionHandle) -> Self {
        // A stored conversation with turns already had its first user turn,
        // even if that turn's text was literally the placeholder.
        let title_frozen = title != PLACEHOLDER_TITLE || handle.turn_count() > 0;
        Self {
            conversation_id,
            title,
            title_frozen,
            handle,
            pending_attachment: None,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn pending_attachment(&self) -> Option<&Attachment> {
        self.pending_attachment.as_ref()
    }
}
