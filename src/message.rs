// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::session_manager::Message;

pub const MESSAGE_REQUIRED: &str = "Message is required.";
pub const RESET_CONFIRMATION: &str = "Conversation has been reset.";

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ChatRequest {
    /// The message text, if it is a non-empty string.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// The `sessionId` query parameter. Extracted leniently, see
/// `services::session_resolver`.
#[derive(Debug, Default, Clone)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: ChatReply,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
