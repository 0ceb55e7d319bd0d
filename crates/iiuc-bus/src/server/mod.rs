use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::{middleware as mw, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::server::endpoints::{
    admin, assistant, auth, me, schedule, status, student, teacher,
};
use crate::server::middleware::*;
use crate::settings::ServerSettings;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Timetable search and the assistant work without the hosted backend
    let public_router = Router::new()
        .route("/health", get(status::get_health))
        .route("/schedules", get(schedule::get_schedules))
        .route("/schedules/routes", get(schedule::get_route_areas))
        .route("/schedules/quick/:preset", get(schedule::get_quick_filter))
        .route("/schedules/:id", get(schedule::get_schedule))
        .route("/assistant/greeting", get(assistant::get_greeting))
        .route("/assistant/messages", post(assistant::post_message));

    // Auth endpoints report offline mode themselves with setup instructions
    let auth_router = Router::new()
        .route("/auth/signin", post(auth::post_sign_in))
        .route("/auth/signup", post(auth::post_sign_up))
        .route("/auth/signout", post(auth::post_sign_out))
        .route("/auth/google", get(auth::get_google_url));

    let student_router = Router::new()
        .route("/student/schedules", get(student::get_schedules))
        .route(
            "/student/feedback",
            get(student::get_feedback).post(student::post_feedback),
        )
        .route(
            "/student/complaints",
            get(student::get_complaints).post(student::post_complaint),
        )
        .layer(mw::from_fn(role_validator::require_student));

    let teacher_router = Router::new()
        .route("/teacher/schedules", get(teacher::get_schedules))
        .route("/teacher/students", get(teacher::get_students))
        .route("/teacher/analytics", get(teacher::get_analytics))
        .layer(mw::from_fn(role_validator::require_teacher));

    let admin_router = Router::new()
        .route("/admin/users", get(admin::get_users))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/schedules", get(admin::get_schedules))
        .route("/admin/schedules/:id", delete(admin::delete_schedule))
        .route("/admin/feedback", get(admin::get_feedback))
        .route("/admin/notices", get(admin::get_notices))
        .route("/admin/notices/:id", delete(admin::delete_notice))
        .layer(mw::from_fn(role_validator::require_admin));

    // Signed-in router. The backend check runs before the session is resolved.
    let session_router = Router::new()
        .route("/me", get(me::get_profile).patch(me::patch_profile))
        .merge(student_router)
        .merge(teacher_router)
        .merge(admin_router)
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            session_validator::validate_session,
        ))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            backend_validator::validate_backend_configured,
        ));

    Router::new()
        .merge(public_router)
        .merge(auth_router)
        .merge(session_router)
        .layer(cors_layer(&app_state.settings.server))
        .with_state(app_state)
}

fn cors_layer(settings: &ServerSettings) -> CorsLayer {
    let origin = match settings.allowed_origin.trim() {
        "*" => AllowOrigin::any(),
        origin => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin = origin, "Invalid allowed origin, allowing any origin");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}
