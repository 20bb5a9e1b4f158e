//! Prompt construction and the Messages API wire format.

use crate::config::ClientConfig;
use crate::error::ServiceError;
use deck_core::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Error types and codes the service uses for rate limiting.
static THROTTLING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ThrottlingException|rate_limit_error").unwrap());

/// Build the translation instruction for `text`.
pub fn build_prompt(text: &str, target: Language) -> String {
    format!(
        "Translate the following text into {}.\n\
         When translating, follow these rules:\n\
         1. Convey the meaning and nuance of the original accurately\n\
         2. Use natural phrasing\n\
         3. Use the standard terms of the target language for technical vocabulary\n\
         4. Keep formatting and special characters unchanged\n\
         5. Output only the translated text, without explanations or extra information\n\
         \n\
         Text to translate:\n\
         {}\n\
         \n\
         Translation:",
        target.display_name(),
        text
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Request body for the Messages endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<Message>,
}

impl MessageRequest {
    pub fn new(config: &ClientConfig, prompt: String) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Turn an HTTP status and body into translated text or a classified error.
pub fn classify_response(status: u16, body: &str) -> Result<String, ServiceError> {
    let error = serde_json::from_str::<ErrorResponse>(body).ok();

    if status == 429 {
        let message = error.map_or_else(|| body.to_string(), |e| e.error.message);
        return Err(ServiceError::Throttled(message));
    }

    // Some gateways report failures with a success status.
    if !(200..300).contains(&status) || error.is_some() {
        let message = match error {
            Some(e) if e.error.message.is_empty() => e.error.kind,
            Some(e) => format!("{}: {}", e.error.kind, e.error.message),
            None => body.trim().chars().take(200).collect(),
        };
        if THROTTLING_REGEX.is_match(body) {
            return Err(ServiceError::Throttled(message));
        }
        return Err(ServiceError::Http { status, message });
    }

    let response: MessageResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ServiceError::Malformed("response has no text content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_language_and_text() {
        let prompt = build_prompt("Quarterly results", Language::Ja);

        assert!(prompt.starts_with("Translate the following text into Japanese."));
        assert!(prompt.contains("\nQuarterly results\n"));
        assert!(prompt.contains("5. Output only the translated text"));
        assert!(prompt.ends_with("Translation:"));
    }

    #[test]
    fn test_request_body() {
        let request = MessageRequest::new(&ClientConfig::default(), "hi".to_string());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_success_takes_first_text_block() {
        let body = r#"{"id":"msg_1","type":"message","content":[{"type":"text","text":"  Bonjour \n"}],"stop_reason":"end_turn"}"#;
        assert_eq!(classify_response(200, body), Ok("Bonjour".to_string()));

        let empty = r#"{"type":"message","content":[]}"#;
        assert!(matches!(
            classify_response(200, empty),
            Err(ServiceError::Malformed(_))
        ));
        let blank = r#"{"type":"message","content":[{"type":"text","text":" \n "}]}"#;
        assert!(matches!(
            classify_response(200, blank),
            Err(ServiceError::Malformed(_))
        ));
        assert!(matches!(
            classify_response(200, "not json"),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn test_throttling_classification() {
        assert!(classify_response(429, "").unwrap_err().is_throttling());

        let rate_limited =
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"Too many requests"}}"#;
        assert!(classify_response(400, rate_limited).unwrap_err().is_throttling());

        let bedrock = r#"{"message":"ThrottlingException: slow down"}"#;
        assert!(classify_response(400, bedrock).unwrap_err().is_throttling());

        let overloaded = r#"{"type":"error","error":{"type":"rate_limit_error","message":"x"}}"#;
        assert!(classify_response(200, overloaded).unwrap_err().is_throttling());
    }

    #[test]
    fn test_other_failures_are_not_throttling() {
        let auth = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        let err = classify_response(401, auth).unwrap_err();

        assert!(!err.is_throttling());
        assert_eq!(
            err,
            ServiceError::Http {
                status: 401,
                message: "authentication_error: invalid x-api-key".to_string()
            }
        );
        assert!(!classify_response(500, "Internal error").unwrap_err().is_throttling());
    }
}
