//! Conversation turns: the unit of history shared by the store and the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Opaque binary input attached to a single user turn.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A model-issued request to run a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCallRequest {
    pub fn new(
        name: impl Into<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// String argument by name, if present and a string.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Text outcome of a tool call. Success and failure look the same here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub name: String,
    pub output: String,
}

/// What a turn carries.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text {
        text: String,
        attachment: Option<Attachment>,
    },
    /// Every call the model emitted in one response, in emission order.
    ToolCalls(Vec<ToolCallRequest>),
    /// The batched results for the preceding `ToolCalls`, in request order.
    ToolResults(Vec<ToolCallResult>),
}

/// One message unit in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: TurnContent::Text {
                text: text.into(),
                attachment: None,
            },
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::text(Role::Model, text)
    }

    pub fn user_with_attachment(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text {
                text: text.into(),
                attachment,
            },
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCalls(calls),
        }
    }

    pub fn tool_results(results: Vec<ToolCallResult>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::ToolResults(results),
        }
    }

    /// The text of a text turn; `None` for tool turns.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::Model.as_str(), "model");
    }

    #[test]
    fn as_text_only_for_text_turns() {
        assert_eq!(Turn::user("hi").as_text(), Some("hi"));
        assert_eq!(Turn::tool_calls(vec![]).as_text(), None);
        assert_eq!(Turn::tool_results(vec![]).as_text(), None);
    }

    #[test]
    fn tool_turns_have_fixed_roles() {
        assert_eq!(Turn::tool_calls(vec![]).role, Role::Model);
        assert_eq!(Turn::tool_results(vec![]).role, Role::User);
    }

    #[test]
    fn str_arg_ignores_non_strings() {
        let mut args = serde_json::Map::new();
        args.insert("code".into(), serde_json::json!("print(1)"));
        args.insert("n".into(), serde_json::json!(3));
        let call = ToolCallRequest::new("execute_code", args);
        assert_eq!(call.str_arg("code"), Some("print(1)"));
        assert_eq!(call.str_arg("n"), None);
        assert_eq!(call.str_arg("missing"), None);
    }

    #[test]
    fn attachment_debug_hides_bytes() {
        let a = Attachment::new("image/png", vec![0u8; 1024]);
        let dbg = format!("{a:?}");
        assert!(dbg.contains("image/png"));
        assert!(dbg.contains("1024"));
        assert!(!dbg.contains("[0, 0"));
    }
}
