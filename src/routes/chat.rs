// src/routes/chat.rs
use axum::{Json, extract::State};
use tracing::{debug, info};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::{chatbot::generate_reply, session_manager::MessageRole},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Сообщение не может быть пустым".to_string()));
    }

    let session_id = match &payload.session_id {
        Some(s) if !s.trim().is_empty() => state.sessions.ensure_session(s.trim()).await,
        _ => {
            let id = state.sessions.create_session().await;
            info!(session_id = %id, "new chat session");
            id
        }
    };

    state.sessions.append_message(&session_id, MessageRole::User, trimmed).await;
    let response = generate_reply(&state, &session_id, trimmed).await;
    state.sessions.append_message(&session_id, MessageRole::Bot, &response).await;
    debug!(%session_id, reply_len = response.len(), "chat reply ready");

    Ok(Json(ChatResponse { response, session_id }))
}
