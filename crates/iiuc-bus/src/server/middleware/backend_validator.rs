use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Rejects requests that need the hosted backend while running in offline mode.
pub async fn validate_backend_configured(
    State(s): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !s.backend.is_configured() {
        warn!(path = %req.uri().path(), "Rejected request in offline mode");
        return ApiErrorType::from((
            StatusCode::SERVICE_UNAVAILABLE,
            "Sign-in and dashboards are unavailable: hosted backend is not configured",
            None,
        ))
        .into_response();
    }

    next.run(req).await
}
