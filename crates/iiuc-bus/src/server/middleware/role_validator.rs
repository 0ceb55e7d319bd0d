use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::backend::Role;
use crate::server::types::ApiErrorType;
use crate::session::Session;

async fn require(role: Role, req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>() else {
        return ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session was not resolved",
            None,
        ))
        .into_response();
    };

    if let Err(e) = session.require_role(role) {
        warn!(
            user_id = %session.profile.id,
            required = %role,
            "Role check failed"
        );
        return ApiErrorType::from(e).into_response();
    }

    next.run(req).await
}

pub async fn require_student(req: Request, next: Next) -> Response {
    require(Role::Student, req, next).await
}

pub async fn require_teacher(req: Request, next: Next) -> Response {
    require(Role::Teacher, req, next).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require(Role::Admin, req, next).await
}
