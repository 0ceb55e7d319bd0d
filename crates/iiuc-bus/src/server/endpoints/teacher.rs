//! Teacher dashboard: full timetable, student directory and statistics.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::backend::BackendError;
use crate::schedule::analytics::{filter_students, ScheduleAnalytics};
use crate::schedule::{DashboardFilter, Gender, ScheduleRecord, Selection};
use crate::server::util::{json_or_error, search_term};
use crate::session::Session;
use crate::types::AppState;

async fn hosted_records(s: &AppState, token: &str) -> Result<Vec<ScheduleRecord>, BackendError> {
    let rows = s.backend.list_schedules(token).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// GET /teacher/schedules
pub async fn get_schedules(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(filter): Query<DashboardFilter>,
) -> Response {
    info!("GET /teacher/schedules");

    let result = hosted_records(&s, &session.access_token)
        .await
        .map(|records| {
            records
                .into_iter()
                .filter(|r| filter.matches(r))
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "teacher schedules")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentQuery {
    pub search: Option<String>,
    pub gender: Selection<Gender>,
}

/// GET /teacher/students
pub async fn get_students(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<StudentQuery>,
) -> Response {
    info!("GET /teacher/students");

    let term = search_term(&query.search);
    let result = s
        .backend
        .list_students(&session.access_token)
        .await
        .map(|students| {
            filter_students(&students, &query.gender)
                .into_iter()
                .filter(|p| p.matches_search(&term))
                .cloned()
                .collect::<Vec<_>>()
        });
    json_or_error(result, StatusCode::OK, "student list")
}

/// GET /teacher/analytics
pub async fn get_analytics(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("GET /teacher/analytics");

    let token = &session.access_token;
    let result = async {
        let records = hosted_records(&s, token).await?;
        let students = s.backend.list_students(token).await?;
        Ok::<_, BackendError>(ScheduleAnalytics::compute(&records, &students))
    }
    .await;
    json_or_error(result, StatusCode::OK, "teacher analytics")
}
