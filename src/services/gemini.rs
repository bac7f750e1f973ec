// src/services/gemini.rs
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;

pub const NO_RESPONSE_REPLY: &str = "No response generated.";
pub const UNAVAILABLE_REPLY: &str = "AI is currently unavailable. Please try again later.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected API response: {0}")]
    NoCandidates(String),

    #[error("malformed API response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        // The URL carries the API key.
        GatewayError::Transport(e.without_url())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the Gemini generateContent endpoint. Each call sends only the
/// current message; no transcript is forwarded.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
        }
    }

    /// Ask the provider for a reply. `Ok("")` means the provider answered
    /// without any text.
    pub async fn generate(&self, message: &str) -> Result<String, GatewayError> {
        let payload = GenerateContentRequest {
            contents: vec![Content { parts: vec![TextPart { text: message }] }],
        };

        debug!(endpoint = %self.endpoint, "Sending generateContent request");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status { status, body });
        }

        extract_text(&body)
    }

    /// Like [`generate`](Self::generate) but always yields something to show the user.
    pub async fn reply(&self, message: &str) -> String {
        reply_text(self.generate(message).await)
    }
}

fn extract_text(body: &str) -> Result<String, GatewayError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(format!("{e}: {body}")))?;

    let first = match parsed.candidates.as_deref() {
        Some([first, ..]) => first,
        _ => return Err(GatewayError::NoCandidates(body.to_string())),
    };

    let parts = first
        .content
        .as_ref()
        .and_then(|c| c.parts.as_ref())
        .ok_or_else(|| GatewayError::Malformed(format!("candidate has no content parts: {body}")))?;

    Ok(parts
        .first()
        .and_then(|p| p.text.clone())
        .unwrap_or_default())
}

/// Turn a gateway result into user-facing text, logging any failure.
pub fn reply_text(result: Result<String, GatewayError>) -> String {
    match result {
        Ok(text) if text.is_empty() => NO_RESPONSE_REPLY.to_string(),
        Ok(text) => text,
        Err(e @ GatewayError::NoCandidates(_)) => {
            error!("{e}");
            UNAVAILABLE_REPLY.to_string()
        }
        Err(e) => {
            error!("API Error: {e}");
            UNAVAILABLE_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let payload = GenerateContentRequest {
            contents: vec![Content { parts: vec![TextPart { text: "hello" }] }],
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn extracts_first_part() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hi!"},{"text":"ignored"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Hi!");
    }

    #[test]
    fn empty_parts_yield_empty_text() {
        let body = r#"{"candidates":[{"content":{"parts":[]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "");
        assert_eq!(reply_text(extract_text(body)), NO_RESPONSE_REPLY);

        let body = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        assert_eq!(reply_text(extract_text(body)), NO_RESPONSE_REPLY);
    }

    #[test]
    fn missing_candidates() {
        for body in [r#"{}"#, r#"{"candidates":[]}"#] {
            assert!(matches!(extract_text(body), Err(GatewayError::NoCandidates(_))));
            assert_eq!(reply_text(extract_text(body)), UNAVAILABLE_REPLY);
        }
    }

    #[test]
    fn missing_nested_structure() {
        for body in [
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            "not json",
        ] {
            assert!(matches!(extract_text(body), Err(GatewayError::Malformed(_))));
            assert_eq!(reply_text(extract_text(body)), UNAVAILABLE_REPLY);
        }
    }
}
