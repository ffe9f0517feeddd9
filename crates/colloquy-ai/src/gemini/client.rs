//! Gemini API client struct, request building, and response parsing.

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use colloquy_common::{Role, ToolCallRequest, Turn, TurnContent};

use crate::tools::to_gemini_tool;
use crate::{AiError, ModelReply, TokenUsage, ToolDefinition};

use super::config::GeminiConfig;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    /// Build the JSON request body for the Gemini API.
    pub(crate) fn build_request_body(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        // Gemini rejects a content whose only part is an empty text.
        let contents: Vec<_> = turns
            .iter()
            .filter(|turn| !is_blank(turn))
            .map(turn_to_content)
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if let Some(system) = system_prompt {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system }]
            });
        }

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_gemini_tool).collect();
            body["tools"] = serde_json::json!([{
                "functionDeclarations": tool_defs
            }]);
        }

        body
    }

    /// Parse a Gemini response.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<ModelReply, AiError> {
        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| AiError::ParseError("no candidates in response".to_string()))?;

        let first = candidates
            .first()
            .ok_or_else(|| AiError::ParseError("empty candidates".to_string()))?;

        let parts = first["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for part in &parts {
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
            if let Some(fc) = part.get("functionCall") {
                let name = fc["name"]
                    .as_str()
                    .ok_or_else(|| AiError::ParseError("functionCall without name".to_string()))?;
                tool_calls.push(ToolCallRequest::new(
                    name,
                    fc["args"].as_object().cloned().unwrap_or_default(),
                ));
            }
        }

        if content.is_empty() && tool_calls.is_empty() {
            let reason = first["finishReason"].as_str().unwrap_or("unknown");
            return Err(AiError::ParseError(format!(
                "model returned no content (finishReason: {reason})"
            )));
        }

        let usage = TokenUsage {
            input_tokens: json["usageMetadata"]["promptTokenCount"]
                .as_u64()
                .unwrap_or(0),
            output_tokens: json["usageMetadata"]["candidatesTokenCount"]
                .as_u64()
                .unwrap_or(0),
        };

        Ok(ModelReply {
            content,
            tool_calls,
            usage,
        })
    }
}

fn is_blank(turn: &Turn) -> bool {
    matches!(
        &turn.content,
        TurnContent::Text { text, attachment: None } if text.is_empty()
    )
}

fn turn_to_content(turn: &Turn) -> serde_json::Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Model => "model",
    };

    let parts: Vec<serde_json::Value> = match &turn.content {
        TurnContent::Text { text, attachment } => {
            let mut parts = vec![serde_json::json!({ "text": text })];
            if let Some(attachment) = attachment {
                parts.push(serde_json::json!({
                    "inlineData": {
                        "mimeType": attachment.media_type,
                        "data": BASE64_STANDARD.encode(&attachment.data),
                    }
                }));
            }
            parts
        }
        TurnContent::ToolCalls(calls) => calls
            .iter()
            .map(|call| {
                serde_json::json!({
                    "functionCall": { "name": call.name, "args": call.arguments }
                })
            })
            .collect(),
        TurnContent::ToolResults(results) => results
            .iter()
            .map(|result| {
                serde_json::json!({
                    "functionResponse": {
                        "name": result.name,
                        "response": { "result": result.output }
                    }
                })
            })
            .collect(),
    };

    serde_json::json!({ "role": role, "parts": parts })
}
