//! In-memory stand-ins for the model channel, tool executor and store.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use colloquy_common::{ConversationId, StoreError, ToolCallRequest, Turn};
use colloquy_store::{ConversationStore, ConversationSummary};

use crate::{AiError, ModelChannel, ModelReply, ToolDefinition, ToolExecutor};

/// A `ModelChannel` that plays back queued replies and records every request.
#[derive(Default)]
pub(crate) struct ScriptedChannel {
    replies: Mutex<VecDeque<Result<ModelReply, AiError>>>,
    requests: Mutex<Vec<Vec<Turn>>>,
    system_prompts: Mutex<Vec<Option<String>>>,
    /// Reply used once the script runs out, if any.
    fallback: Option<fn() -> ModelReply>,
}

impl ScriptedChannel {
    pub(crate) fn new(replies: Vec<Result<ModelReply, AiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// A channel that answers every request with `reply()`.
    pub(crate) fn repeating(reply: fn() -> ModelReply) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn system_prompts(&self) -> Vec<Option<String>> {
        self.system_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelChannel for ScriptedChannel {
    async fn send_message(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
        _tools: &[ToolDefinition],
    ) -> Result<ModelReply, AiError> {
        self.requests.lock().unwrap().push(turns.to_vec());
        self.system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.map(str::to_string));

        let next = self.replies.lock().unwrap().pop_front();
        match (next, self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(fallback)) => Ok(fallback()),
            (None, None) => Err(AiError::ApiError("script exhausted".into())),
        }
    }
}

/// A `ToolExecutor` that records the code it was given.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute(&self, code: &str) -> String {
        let mut calls = self.calls.lock().unwrap();
        calls.push(code.to_string());
        format!("Output:\nrun #{}: {code}\n", calls.len())
    }
}

/// A store whose writes always fail.
#[derive(Default)]
pub(crate) struct FailingStore;

impl ConversationStore for FailingStore {
    fn save(&self, _id: &ConversationId, _title: &str, _turns: &[Turn]) -> Result<(), StoreError> {
        Err(StoreError::Query("database is locked".into()))
    }

    fn list_all(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        Ok(Vec::new())
    }

    fn load(&self, _id: &ConversationId) -> Result<Vec<Turn>, StoreError> {
        Ok(Vec::new())
    }

    fn delete(&self, _id: &ConversationId) -> Result<(), StoreError> {
        Ok(())
    }
}

pub(crate) fn code_call(code: &str) -> ToolCallRequest {
    let mut args = serde_json::Map::new();
    args.insert("code".into(), serde_json::json!(code));
    ToolCallRequest::new("execute_code", args)
}
