//! Conversation engine for Colloquy.
//!
//! Provides:
//! - the `ModelChannel` contract and a Gemini implementation
//! - a sandboxed code-execution tool
//! - session handles with an automatic, bounded tool-call loop
//! - the `Orchestrator` that runs a user turn and persists the result

pub mod engine;
pub mod gemini;
pub mod session;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use colloquy_common::{ToolCallRequest, Turn};

pub use engine::{EngineContext, EngineError, Orchestrator, TurnReply};
pub use gemini::{GeminiClient, GeminiConfig};
pub use session::{LoopOutcome, SessionHandle, SessionManager, PLACEHOLDER_TITLE};
pub use tools::{CodeExecutor, ExecutionSandbox, ToolExecutor};

/// The remote language model, seen as a request/response channel.
#[async_trait]
pub trait ModelChannel: Send + Sync {
    /// Send the whole conversation so far and get the model's next reply.
    async fn send_message(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, AiError>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One model response: either final text or tool-call requests.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: TokenUsage,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// Failures of the model channel itself. Tool failures never show up here.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}
