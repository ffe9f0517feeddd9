//! Agent persona and tool-loop configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a highly qualified programming expert. \
You master Web development (including React, Vue, HTML, CSS and JavaScript) and \
Android development (Kotlin and Java). Your answers must be precise and didactic, \
and include relevant code snippets. Use Markdown to format code. \
When a computation or a check would benefit from running code, call the \
execute_code tool and print the values you need to see.";

/// Persona and conversation-engine limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// System instruction sent with every model request.
    pub system_prompt: String,
    /// Maximum tool round-trips per user turn (valid range: 1-100).
    pub max_tool_rounds: u32,
    /// Length of the title derived from the first user message (valid range: 10-200).
    pub title_max_chars: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: 10,
            title_max_chars: 50,
        }
    }
}
