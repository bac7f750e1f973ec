// src/services/mod.rs
pub mod gemini;
pub mod session_manager;
pub mod session_resolver;
