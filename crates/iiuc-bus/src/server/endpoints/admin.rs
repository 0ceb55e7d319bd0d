//! Admin dashboard: users, timetable, feedback and notices.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::server::util::{json_or_error, search_term};
use crate::session::Session;
use crate::types::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// GET /admin/users
pub async fn get_users(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Response {
    info!("GET /admin/users");

    let term = search_term(&query.search);
    let result = s
        .backend
        .list_users(&session.access_token)
        .await
        .map(|users| {
            users
                .into_iter()
                .filter(|u| u.matches_search(&term))
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "user list")
}

/// DELETE /admin/users/:id
pub async fn delete_user(
    Path(id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("DELETE /admin/users/{}", id);

    if id == session.profile.id {
        warn!(user_id = %id, "Admin tried to delete own account");
    }

    let result = s.backend.delete_user(&session.access_token, &id).await;
    if result.is_ok() {
        s.profiles.invalidate_user(&id);
    }
    json_or_error(result.map(|()| serde_json::json!({ "deleted": id })), StatusCode::OK, "user delete")
}

/// GET /admin/schedules
pub async fn get_schedules(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Response {
    info!("GET /admin/schedules");

    let term = search_term(&query.search);
    let result = s
        .backend
        .list_schedules(&session.access_token)
        .await
        .map(|rows| {
            rows.into_iter()
                .filter(|r| r.matches_search(&term))
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "schedule list")
}

/// DELETE /admin/schedules/:id
pub async fn delete_schedule(
    Path(id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("DELETE /admin/schedules/{}", id);

    let result = s.backend.delete_schedule(&session.access_token, &id).await;
    json_or_error(result.map(|()| serde_json::json!({ "deleted": id })), StatusCode::OK, "schedule delete")
}

/// GET /admin/feedback
/// All feedback with author details
pub async fn get_feedback(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Response {
    info!("GET /admin/feedback");

    let term = search_term(&query.search);
    let result = s
        .backend
        .list_all_feedback(&session.access_token)
        .await
        .map(|items| {
            items
                .into_iter()
                .filter(|f| f.matches_search(&term))
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "feedback list")
}

/// GET /admin/notices
pub async fn get_notices(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Response {
    info!("GET /admin/notices");

    let term = search_term(&query.search);
    let result = s
        .backend
        .list_notices(&session.access_token)
        .await
        .map(|notices| {
            notices
                .into_iter()
                .filter(|n| n.matches_search(&term))
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "notice list")
}

/// DELETE /admin/notices/:id
pub async fn delete_notice(
    Path(id): Path<String>,
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("DELETE /admin/notices/{}", id);

    let result = s.backend.delete_notice(&session.access_token, &id).await;
    json_or_error(result.map(|()| serde_json::json!({ "deleted": id })), StatusCode::OK, "notice delete")
}
