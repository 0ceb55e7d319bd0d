use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::backend::{AuthError, BackendError};
use crate::session::SessionError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    /// Page the web app should send the user to instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl ApiErrorType {
    pub fn with_redirect(mut self, redirect: &'static str) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, context): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            context,
            redirect: None,
        }
    }
}

impl From<BackendError> for ApiErrorType {
    fn from(err: BackendError) -> Self {
        let (status, message) = match &err {
            BackendError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Hosted backend is not configured",
            ),
            BackendError::Timeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "Hosted backend timed out")
            }
            e if e.needs_reauth() => (StatusCode::UNAUTHORIZED, "Session expired, sign in again"),
            BackendError::Api { .. } => (StatusCode::BAD_GATEWAY, "Hosted backend rejected the request"),
            _ => (StatusCode::BAD_GATEWAY, "Failed to reach hosted backend"),
        };
        ApiErrorType::from((status, message, Some(err.to_string())))
    }
}

impl From<AuthError> for ApiErrorType {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailNotConfirmed => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AuthError::AlreadyRegistered => StatusCode::CONFLICT,
            AuthError::NeedsSetup { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Rejected { .. } => StatusCode::BAD_REQUEST,
        };
        ApiErrorType::from((status, err.to_string().as_str(), None))
    }
}

impl From<SessionError> for ApiErrorType {
    fn from(err: SessionError) -> Self {
        let detail = err.to_string();
        match err {
            SessionError::MissingToken => {
                ApiErrorType::from((StatusCode::UNAUTHORIZED, "Missing bearer token", None))
                    .with_redirect("/login")
            }
            SessionError::Unconfirmed => ApiErrorType::from((
                StatusCode::FORBIDDEN,
                "Please check your email and click the confirmation link before signing in.",
                None,
            ))
            .with_redirect("/login"),
            SessionError::WrongRole { redirect, .. } => ApiErrorType::from((
                StatusCode::FORBIDDEN,
                "Not allowed for this role",
                Some(detail),
            ))
            .with_redirect(redirect),
            SessionError::Backend(e) => {
                let reauth = e.needs_reauth();
                let api = ApiErrorType::from(e);
                if reauth {
                    api.with_redirect("/login")
                } else {
                    api
                }
            }
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
