//! Errors from the translation service.

use thiserror::Error;

/// A failed translation request.
///
/// Only [`ServiceError::Throttled`] is retried; everything else ends the
/// request at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service asked us to slow down.
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// The service answered with an error status.
    #[error("Service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never got an answer.
    #[error("Network error: {0}")]
    Network(String),

    /// The answer could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The client is missing something it needs to send requests.
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    pub fn is_throttling(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) if status.as_u16() == 429 => Self::Throttled(e.to_string()),
            Some(status) => Self::Http {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Self::Network(e.to_string()),
        }
    }
}
