//! Client configuration.

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Settings for [`TranslationClient`](crate::TranslationClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Messages endpoint URL.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Total attempts per text, including the first.
    pub max_attempts: u32,
    /// Wait before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: 4000,
            temperature: 0.0,
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }
}

impl ClientConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Wait before the given retry (1-based attempt that just failed).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}
