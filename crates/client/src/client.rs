//! The retrying translation client.

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::message::{build_prompt, MessageRequest};
use crate::transport::{HttpTransport, Transport};
use deck_core::{Language, Translation, Translator};
use std::time::Duration;

/// Translates text through a [`Transport`], retrying throttled requests.
///
/// Never fails: once retries are used up, or on any other error, the source
/// text is handed back as [`Translation::PassedThrough`].
pub struct TranslationClient<T: Transport> {
    config: ClientConfig,
    transport: T,
    sleep: Box<dyn Fn(Duration)>,
}

impl TranslationClient<HttpTransport> {
    /// A client talking HTTPS to the configured endpoint.
    pub fn connect(config: ClientConfig) -> Result<Self, ServiceError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> TranslationClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace how the client waits between retries.
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, text: &str, target: Language) -> Result<String, ServiceError> {
        let request = MessageRequest::new(&self.config, build_prompt(text, target));
        let attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.transport.send(&request) {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_throttling() && attempt < attempts => {
                    let wait = self.config.retry_delay(attempt);
                    log::warn!(
                        "Throttled, retrying in {}s ({}/{})",
                        wait.as_secs(),
                        attempt,
                        attempts
                    );
                    (self.sleep)(wait);
                    attempt += 1;
                }
                Err(e) if e.is_throttling() => {
                    log::warn!("Giving up after {} attempts: {}", attempts, e);
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<T: Transport> Translator for TranslationClient<T> {
    fn translate(&self, text: &str, target: Language) -> Translation {
        match self.request(text, target) {
            Ok(translated) => Translation::Translated(translated),
            Err(e) => {
                log::warn!("Translation failed, keeping original text: {}", e);
                Translation::PassedThrough {
                    text: text.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
