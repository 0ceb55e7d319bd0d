use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::types::AppState;

/// GET /health
/// Liveness plus whether the hosted backend is reachable by configuration
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /health");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "backend_configured": s.backend.is_configured(),
            "schedules": s.dataset.len(),
            "profile_cache": s.profiles.stats(),
        })),
    )
        .into_response()
}
