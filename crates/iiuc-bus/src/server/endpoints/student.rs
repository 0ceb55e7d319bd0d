//! Student dashboard: timetable for the student's gender, feedback and complaints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::backend::{ComplaintCategory, ComplaintPriority, NewComplaint, NewFeedback};
use crate::schedule::{DashboardFilter, ScheduleRecord};
use crate::server::types::ApiErrorType;
use crate::server::util::json_or_error;
use crate::session::Session;
use crate::types::AppState;

/// GET /student/schedules
/// Hosted trips open to everyone or reserved for the student's gender
pub async fn get_schedules(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(filter): Query<DashboardFilter>,
) -> Response {
    info!("GET /student/schedules");

    let result = s
        .backend
        .list_schedules_for(&session.access_token, session.profile.gender)
        .await
        .map(|rows| {
            let records: Vec<ScheduleRecord> = rows.into_iter().map(Into::into).collect();
            records
                .into_iter()
                .filter(|r| filter.matches(r))
                .collect::<Vec<_>>()
        });

    json_or_error(result, StatusCode::OK, "student schedules")
}

/// GET /student/feedback
pub async fn get_feedback(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("GET /student/feedback");

    let result = s
        .backend
        .list_feedback_for(&session.access_token, &session.profile.id)
        .await;
    json_or_error(result, StatusCode::OK, "feedback list")
}

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    pub message: String,
}

/// POST /student/feedback
pub async fn post_feedback(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(body): Json<FeedbackBody>,
) -> Response {
    info!("POST /student/feedback");

    if body.message.trim().is_empty() {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "Feedback must not be empty", None))
            .into_response();
    }

    let feedback = NewFeedback {
        user_id: session.profile.id.clone(),
        message: body.message,
    };
    let result = s
        .backend
        .insert_feedback(&session.access_token, &feedback)
        .await;
    json_or_error(result, StatusCode::CREATED, "feedback submit")
}

/// GET /student/complaints
pub async fn get_complaints(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("GET /student/complaints");

    let result = s
        .backend
        .list_complaints_for(&session.access_token, &session.profile.id)
        .await;
    json_or_error(result, StatusCode::OK, "complaint list")
}

/// Complaint form. Category and priority default to `other` and `medium`.
#[derive(Debug, Deserialize)]
pub struct ComplaintBody {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: ComplaintCategory,
    #[serde(default)]
    pub priority: ComplaintPriority,
    #[serde(default)]
    pub bus_route: Option<String>,
    #[serde(default)]
    pub incident_time: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ComplaintBody {
    fn into_new(self, user_id: String) -> Result<NewComplaint, &'static str> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Title and description are required");
        }
        Ok(NewComplaint {
            user_id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            bus_route: non_blank(self.bus_route),
            incident_time: non_blank(self.incident_time),
        })
    }
}

/// POST /student/complaints
pub async fn post_complaint(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(body): Json<ComplaintBody>,
) -> Response {
    info!("POST /student/complaints");

    let complaint = match body.into_new(session.profile.id.clone()) {
        Ok(complaint) => complaint,
        Err(message) => {
            return ApiErrorType::from((StatusCode::BAD_REQUEST, message, None)).into_response()
        }
    };

    let result = s
        .backend
        .insert_complaint(&session.access_token, &complaint)
        .await;
    json_or_error(result, StatusCode::CREATED, "complaint submit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complaint_defaults() {
        let body: ComplaintBody = serde_json::from_value(json!({
            "title": "Bus late",
            "description": "The 7:00 AM BOT bus was 40 minutes late",
            "bus_route": "  "
        }))
        .unwrap();
        let complaint = body.into_new("u1".to_string()).unwrap();
        assert_eq!(complaint.category, ComplaintCategory::Other);
        assert_eq!(complaint.priority, ComplaintPriority::Medium);
        assert_eq!(complaint.bus_route, None);
    }

    #[test]
    fn test_complaint_requires_title() {
        let body: ComplaintBody = serde_json::from_value(json!({
            "title": " ",
            "description": "x",
            "category": "safety",
            "priority": "urgent"
        }))
        .unwrap();
        assert!(body.into_new("u1".to_string()).is_err());
    }
}
