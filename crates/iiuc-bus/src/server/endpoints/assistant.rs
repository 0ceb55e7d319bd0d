use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// GET /assistant/greeting
pub async fn get_greeting(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /assistant/greeting");

    (StatusCode::OK, Json(s.assistant.greeting())).into_response()
}

/// POST /assistant/messages
/// Answers one chat message after the assistant's thinking delay
pub async fn post_message(
    State(s): State<Arc<AppState>>,
    Json(body): Json<MessageBody>,
) -> Response {
    info!("POST /assistant/messages");

    match s.assistant.respond(&body.message, s.dataset.records()).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => ApiErrorType::from((StatusCode::BAD_REQUEST, "Message must not be empty", None))
            .into_response(),
    }
}
