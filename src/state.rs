// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::gemini::GeminiClient;
use crate::services::session_manager::{SessionManager, SessionStore};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub gemini: GeminiClient,
}

impl AppState {
    /// In-memory sessions.
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, Arc::new(SessionManager::new()))
    }

    pub fn with_store(config: &Config, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            sessions,
            gemini: GeminiClient::new(config),
        }
    }
}
