//! The conversation orchestrator.

use std::sync::Arc;

use colloquy_common::{new_correlation_id, Attachment, ConversationId, Turn};
use colloquy_store::ConversationSummary;
use tracing::{debug, info, warn};

use crate::session::{LoopOutcome, SessionManager};
use crate::tools::ToolExecutor;
use crate::{ModelChannel, TokenUsage};

use super::context::EngineContext;
use super::error::EngineError;

/// The result of a completed user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    pub usage: TokenUsage,
    /// Tool rounds the model needed before answering.
    pub tool_rounds: u32,
}

/// Accepts user turns for the current conversation, runs the tool-calling
/// loop and saves the updated history.
pub struct Orchestrator {
    channel: Arc<dyn ModelChannel>,
    executor: Arc<dyn ToolExecutor>,
    sessions: SessionManager,
    context: EngineContext,
    title_max_chars: usize,
}

impl Orchestrator {
    /// Create an orchestrator positioned on a brand-new conversation.
    pub fn new(
        channel: Arc<dyn ModelChannel>,
        executor: Arc<dyn ToolExecutor>,
        sessions: SessionManager,
    ) -> Self {
        let (id, title, handle) = sessions.start_new();
        Self {
            channel,
            executor,
            sessions,
            context: EngineContext::new(id, title, handle),
            title_max_chars: 50,
        }
    }

    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Switch to a fresh conversation, discarding the current handle.
    pub fn new_conversation(&mut self) -> &ConversationId {
        let (id, title, handle) = self.sessions.start_new();
        self.context = EngineContext::new(id, title, handle);
        &self.context.conversation_id
    }

    /// Switch to a stored conversation, discarding the current handle.
    ///
    /// On failure the current conversation stays active.
    pub fn open_conversation(
        &mut self,
        id: ConversationId,
        title: impl Into<String>,
    ) -> Result<(), EngineError> {
        let title = title.into();
        let handle = self.sessions.resume(&id, &title)?;
        self.context = EngineContext::new(id, title, handle);
        Ok(())
    }

    /// Stored conversations, most recently saved first.
    pub fn conversations(&self) -> Result<Vec<ConversationSummary>, EngineError> {
        Ok(self.sessions.store().list_all()?)
    }

    /// Queue an attachment for the next user turn, replacing any queued one.
    pub fn attach(&mut self, attachment: Attachment) {
        debug!(
            media_type = %attachment.media_type,
            bytes = attachment.data.len(),
            "attachment queued"
        );
        self.context.pending_attachment = Some(attachment);
    }

    /// Run one user turn to completion and save the conversation.
    ///
    /// On a channel failure or an exceeded round limit the conversation is
    /// left exactly as it was, including the queued attachment. On a store
    /// failure the new turns stay in memory and `persist` can be retried.
    pub async fn handle_user_turn(&mut self, user_text: &str) -> Result<TurnReply, EngineError> {
        let turn_id = new_correlation_id();
        let attachment = self.context.pending_attachment.take();
        info!(
            turn = %turn_id,
            conversation = %self.context.conversation_id,
            attachment = attachment.is_some(),
            "handling user turn"
        );

        let user_turn = Turn::user_with_attachment(user_text, attachment.clone());
        let outcome = self
            .context
            .handle
            .chat(self.channel.as_ref(), self.executor.as_ref(), user_turn)
            .await;

        let (text, usage, tool_rounds) = match outcome {
            Ok(LoopOutcome::Final {
                text,
                usage,
                rounds,
            }) => (text, usage, rounds),
            Ok(LoopOutcome::ToolLoopExceeded { rounds, .. }) => {
                self.context.pending_attachment = attachment;
                warn!(turn = %turn_id, rounds, "tool loop limit reached");
                return Err(EngineError::ToolLoopExceeded {
                    limit: self.context.handle.max_tool_rounds(),
                });
            }
            Err(e) => {
                self.context.pending_attachment = attachment;
                warn!(turn = %turn_id, error = %e, "model channel failed");
                return Err(e.into());
            }
        };

        if !self.context.title_frozen {
            if let Some(title) = derive_title(user_text, self.title_max_chars) {
                debug!(turn = %turn_id, title = %title, "conversation titled");
                self.context.title = title;
            }
            self.context.title_frozen = true;
        }

        if let Err(e) = self.persist() {
            warn!(turn = %turn_id, error = %e, "turn completed but was not saved");
            return Err(e);
        }

        info!(
            turn = %turn_id,
            tool_rounds,
            tokens = usage.total_tokens(),
            "turn complete"
        );
        Ok(TurnReply {
            text,
            usage,
            tool_rounds,
        })
    }

    /// Save the current conversation under its id.
    pub fn persist(&self) -> Result<(), EngineError> {
        let ctx = &self.context;
        self.sessions
            .store()
            .save(&ctx.conversation_id, &ctx.title, ctx.handle.turns())?;
        Ok(())
    }
}

/// Title for a conversation whose first user message is `text`: the first
/// `max_chars` characters, with `...` appended when cut. Blank text gives
/// no title.
pub fn derive_title(text: &str, max_chars: usize) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        Some(format!("{head}..."))
    } else {
        Some(head)
    }
}
