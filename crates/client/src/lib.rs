//! Client for an LLM translation service.
//!
//! Each text is sent as one Messages request. Throttled requests are retried
//! with a linearly growing wait; any other failure, or running out of
//! attempts, hands the source text back unchanged.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod transport;

pub use client::TranslationClient;
pub use config::ClientConfig;
pub use error::ServiceError;
pub use message::{build_prompt, classify_response, MessageRequest};
pub use transport::{HttpTransport, Transport};
