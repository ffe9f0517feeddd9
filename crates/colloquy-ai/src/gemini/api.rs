//! ModelChannel implementation for GeminiClient.

use async_trait::async_trait;
use colloquy_common::Turn;
use tracing::debug;

use crate::{AiError, ModelChannel, ModelReply, ToolDefinition};

use super::client::GeminiClient;

fn transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl ModelChannel for GeminiClient {
    async fn send_message(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, AiError> {
        let body = self.build_request_body(system_prompt, turns, tools);
        let url = self.api_url();

        debug!(model = %self.config.model, turns = turns.len(), "Gemini API request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(json)
    }
}
