// src/services/session_manager.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, Result};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system_prompt() -> Self {
        Self::new(MessageRole::System, SYSTEM_PROMPT)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Bot, content)
    }
}

/// A transcript that always starts with the system prompt.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), messages: vec![Message::system_prompt()] }
    }
}

/// Storage seam for conversation transcripts. Route handlers only see this
/// trait, so the backing map can be swapped without touching them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create the session with a fresh system prompt if it does not exist yet.
    async fn ensure_session(&self, id: &str) -> Result<()>;

    /// Append to an existing session and return the new history length.
    async fn append_message(&self, id: &str, message: Message) -> Result<usize>;

    /// Replace the history with a single system prompt.
    async fn reset_session(&self, id: &str) -> Result<()>;

    async fn get_history(&self, id: &str) -> Result<Option<Vec<Message>>>;

    async fn len(&self) -> usize;

    async fn list_session_ids(&self) -> Vec<String>;
}

/// In-memory store, lives as long as the process.
#[derive(Clone, Default)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for SessionManager {
    async fn ensure_session(&self, id: &str) -> Result<()> {
        {
            let guard = self.inner.read().await;
            if guard.contains_key(id) {
                return Ok(());
            }
        }
        let mut guard = self.inner.write().await;
        // Another request may have created it between the two locks.
        guard.entry(id.to_string()).or_insert_with(|| {
            info!(session_id = %id, "Creating new session");
            Session::new(id)
        });
        Ok(())
    }

    async fn append_message(&self, id: &str, message: Message) -> Result<usize> {
        let mut guard = self.inner.write().await;
        let session = guard
            .get_mut(id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        session.messages.push(message);
        Ok(session.messages.len())
    }

    async fn reset_session(&self, id: &str) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.insert(id.to_string(), Session::new(id));
        Ok(())
    }

    async fn get_history(&self, id: &str) -> Result<Option<Vec<Message>>> {
        let guard = self.inner.read().await;
        Ok(guard.get(id).map(|s| s.messages.clone()))
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn list_session_ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }
}
