use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::backend::ProfileUpdate;
use crate::server::types::ApiErrorType;
use crate::server::util::json_or_error;
use crate::session::Session;
use crate::types::AppState;

/// GET /me
pub async fn get_profile(Extension(session): Extension<Session>) -> Response {
    info!("GET /me");

    (StatusCode::OK, Json(session.profile)).into_response()
}

/// PATCH /me
/// Updates the caller's own profile and refreshes the cached copy
pub async fn patch_profile(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(patch): Json<ProfileUpdate>,
) -> Response {
    info!("PATCH /me");

    if patch.is_empty() {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "Nothing to update", None))
            .into_response();
    }

    let result = s
        .backend
        .update_profile(&session.access_token, &session.profile.id, &patch)
        .await;

    if let Ok(profile) = &result {
        s.profiles.invalidate_user(&profile.id);
        s.profiles.insert(session.key(), profile.clone());
    }

    json_or_error(result, StatusCode::OK, "profile update")
}
