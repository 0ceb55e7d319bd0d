//! Sign-in, sign-up, sign-out and Google OAuth endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::SignUpForm;
use crate::server::middleware::session_validator::bearer_token;
use crate::server::types::ApiErrorType;
use crate::session::{Session, SessionError, SessionKey};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    /// Email address or university ID.
    pub identifier: String,
    pub password: String,
}

/// POST /auth/signin
///
/// Returns the tokens, the caller's profile and the dashboard to open.
pub async fn post_sign_in(
    State(s): State<Arc<AppState>>,
    Json(body): Json<SignInBody>,
) -> Response {
    info!("POST /auth/signin");

    let auth = match s.backend.sign_in(&body.identifier, &body.password).await {
        Ok(auth) => auth,
        Err(e) => return ApiErrorType::from(e).into_response(),
    };

    let (profile, redirect) =
        match Session::resolve(&s.backend, &s.profiles, &auth.access_token).await {
            Ok(session) => {
                let redirect = session.role().dashboard_route();
                (Some(session.profile), Some(redirect))
            }
            Err(e) => {
                warn!(error = %e, "Signed in but profile could not be loaded");
                (None, None)
            }
        };

    (
        StatusCode::OK,
        Json(json!({
            "session": auth,
            "profile": profile,
            "redirect": redirect,
        })),
    )
        .into_response()
}

/// POST /auth/signup
pub async fn post_sign_up(
    State(s): State<Arc<AppState>>,
    Json(form): Json<SignUpForm>,
) -> Response {
    info!("POST /auth/signup");

    match s.backend.sign_up(&form).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /auth/signout
pub async fn post_sign_out(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    info!("POST /auth/signout");

    let Some(token) = bearer_token(&headers) else {
        return ApiErrorType::from(SessionError::MissingToken).into_response();
    };

    let key = SessionKey::from_token(token);
    s.profiles.invalidate(&key);

    match s.backend.sign_out(token).await {
        Ok(()) => {
            info!(session = %key, "Signed out");
            (StatusCode::OK, Json(json!({ "signed_out": true }))).into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /auth/google
/// URL that starts the Google sign-in flow
pub async fn get_google_url(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /auth/google");

    match s.backend.google_sign_in_url().await {
        Ok(url) => (StatusCode::OK, Json(json!({ "url": url.as_str() }))).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
