//! Model provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the remote language model.
///
/// The API key is deliberately absent: it is read from the environment
/// when the client is built and never written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    /// Maximum output tokens per response (valid range: 1-65536).
    pub max_tokens: u32,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
    /// HTTP request timeout in seconds (valid range: 5-600).
    pub request_timeout_secs: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            request_timeout_secs: 120,
        }
    }
}
