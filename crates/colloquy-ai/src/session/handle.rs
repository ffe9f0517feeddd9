//! The in-memory state of one active conversation.

use colloquy_common::Turn;

use crate::ToolDefinition;

/// Live association between a conversation and the model.
///
/// The handle owns the turn history sent to the model on every hop, along
/// with the persona and tool declarations it was created with.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Conversation turns in order.
    pub(super) turns: Vec<Turn>,
    /// Persona sent with every request.
    pub(super) system_prompt: Option<String>,
    /// Tools the model may call.
    pub(super) tools: Vec<ToolDefinition>,
    /// Tool rounds allowed per user turn before the loop gives up.
    pub(super) max_tool_rounds: u32,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            system_prompt: None,
            tools: Vec::new(),
            max_tool_rounds: 10,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Seed the handle with previously stored turns.
    pub fn with_turns(mut self, turns: Vec<Turn>) -> Self {
        self.turns = turns;
        self
    }

    /// Get the full conversation history.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Number of turns in history.
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
