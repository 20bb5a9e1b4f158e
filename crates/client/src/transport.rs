//! Sending a request to the translation service.

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::message::{classify_response, MessageRequest};

/// Something that can deliver one request and return the translated text.
pub trait Transport {
    fn send(&self, request: &MessageRequest) -> Result<String, ServiceError>;
}

/// HTTPS transport to a Messages-style endpoint.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServiceError::Configuration("no API key configured".to_string()))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            api_version: config.api_version.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &MessageRequest) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        classify_response(status, &body)
    }
}
