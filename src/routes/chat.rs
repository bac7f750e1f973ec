use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use tracing::debug;

use crate::{
    error::{AppError, Result},
    message::{
        ChatReply, ChatRequest, ChatResponse, HistoryResponse, MESSAGE_REQUIRED, RESET_CONFIRMATION,
        ResetResponse, SessionQuery,
    },
    services::{session_manager::Message, session_resolver::resolve_session},
    state::SharedState,
};

pub const ROOT_BANNER: &str = "AI Chatbot Backend is Running!";

pub async fn root_handler() -> &'static str {
    ROOT_BANNER
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: SessionQuery,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    // Validate before touching any session.
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let message = payload
        .text()
        .ok_or_else(|| AppError::BadRequest(MESSAGE_REQUIRED.to_string()))?;

    let session_id = resolve_session(state.sessions.as_ref(), &headers, &query).await?;

    state
        .sessions
        .append_message(&session_id, Message::user(message))
        .await?;

    let reply = state.gemini.reply(message).await;

    let len = state
        .sessions
        .append_message(&session_id, Message::bot(&reply))
        .await?;
    debug!(session_id = %session_id, history_len = len, "Chat turn recorded");

    Ok(Json(ChatResponse {
        reply: ChatReply { content: reply, session_id },
    }))
}

pub async fn history_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: SessionQuery,
) -> Result<Json<HistoryResponse>> {
    let session_id = resolve_session(state.sessions.as_ref(), &headers, &query).await?;
    let history = state
        .sessions
        .get_history(&session_id)
        .await?
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    Ok(Json(HistoryResponse { session_id, history }))
}

pub async fn reset_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: SessionQuery,
) -> Result<Json<ResetResponse>> {
    let session_id = resolve_session(state.sessions.as_ref(), &headers, &query).await?;
    state.sessions.reset_session(&session_id).await?;

    Ok(Json(ResetResponse {
        message: RESET_CONFIRMATION.to_string(),
        session_id,
    }))
}
