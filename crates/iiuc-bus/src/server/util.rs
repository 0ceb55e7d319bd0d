use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::backend::BackendError;
use crate::server::types::ApiErrorType;

/// Serializes `result` with `status`, or turns the backend error into a response.
pub fn json_or_error<T: Serialize>(
    result: Result<T, BackendError>,
    status: StatusCode,
    operation: &str,
) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => {
            error!(operation = operation, error = %e, "Hosted backend call failed");
            ApiErrorType::from(e).into_response()
        }
    }
}

/// Lowercased, trimmed search term, empty when absent.
pub fn search_term(search: &Option<String>) -> String {
    search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default()
}
