//! Router for the chat API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;

/// Run one turn and respond with the assistant's reply
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<Response, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            "Please type a message before sending.",
        )
            .into_response());
    }

    let mut session = state.session.lock().await;
    let reply = session.send(message).await?;

    Ok(Json(public::ChatResponse::new(&reply)).into_response())
}

/// Turns completed so far in this session
async fn chat_history(State(state): State<SharedState>) -> Json<public::ChatHistoryResponse> {
    let session = state.session.lock().await;
    Json(public::ChatHistoryResponse {
        history: session.history.turns().to_vec(),
    })
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/history", get(chat_history))
}
