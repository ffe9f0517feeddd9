//! Gemini API client configuration.

use std::time::Duration;

use crate::AiError;

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Create config from the environment.
    ///
    /// Resolution order:
    /// 1. `GEMINI_API_KEY`
    /// 2. `GOOGLE_API_KEY`
    pub fn from_env() -> Result<Self, AiError> {
        ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                AiError::ApiError(
                    "Gemini API not configured. Set GEMINI_API_KEY or GOOGLE_API_KEY.".into(),
                )
            })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
