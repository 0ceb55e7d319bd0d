//! Error types for the hosted backend.

use thiserror::Error;

/// Errors that can occur while talking to the hosted backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// URL or key missing, or still the placeholder project
    #[error("Hosted backend is not configured")]
    NotConfigured,

    /// The call did not finish within its client-side limit
    #[error("{operation} timeout")]
    Timeout { operation: &'static str },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend answered with an error status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl BackendError {
    /// Returns true if the access token was rejected.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, BackendError::Api { status: 401 | 403, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout { .. })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode {
                message: err.to_string(),
            }
        } else {
            BackendError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for BackendError {
    fn from(err: url::ParseError) -> Self {
        BackendError::UrlError {
            message: err.to_string(),
        }
    }
}

const EMAIL_NOT_CONFIRMED: &str =
    "Please check your email and click the confirmation link before signing in.";
const INVALID_CREDENTIALS: &str =
    "Invalid email/university ID or password. Please check your credentials.";
const CONNECTION_TIMEOUT: &str =
    "Connection timeout. Please check your internet connection and try again.";

/// Sign-in, sign-up and OAuth failures, phrased for the person using the app.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Form input rejected before contacting the backend
    #[error("{0}")]
    Validation(String),

    #[error("{}", EMAIL_NOT_CONFIRMED)]
    EmailNotConfirmed,

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", CONNECTION_TIMEOUT)]
    Timeout,

    #[error("This email is already registered. Please try logging in instead.")]
    AlreadyRegistered,

    /// The provider or backend project is missing configuration
    #[error("{message}")]
    NeedsSetup { message: String },

    /// Any other refusal, carrying the backend's own message
    #[error("{message}")]
    Rejected { message: String },
}

impl AuthError {
    /// Classifies a failed password sign-in.
    pub fn from_sign_in(err: &BackendError) -> Self {
        if matches!(err, BackendError::NotConfigured) {
            return AuthError::not_configured();
        }

        let message = err.to_string();
        if message.contains("Email not confirmed") || message.contains("confirmation") {
            AuthError::EmailNotConfirmed
        } else if message.contains("Invalid login credentials") {
            AuthError::InvalidCredentials
        } else if message.contains("timeout") {
            AuthError::Timeout
        } else {
            AuthError::rejected(message, "Login failed. Please try again.")
        }
    }

    /// Classifies a failed sign-up.
    pub fn from_sign_up(err: &BackendError) -> Self {
        if matches!(err, BackendError::NotConfigured) {
            return AuthError::not_configured();
        }

        let message = err.to_string();
        if message.contains("already registered") || message.contains("already been registered") {
            AuthError::AlreadyRegistered
        } else if message.contains("email") {
            AuthError::Validation("Please enter a valid email address.".to_string())
        } else if message.contains("password") {
            AuthError::Validation("Password must be at least 6 characters long.".to_string())
        } else if err.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::rejected(message, "Registration failed. Please try again.")
        }
    }

    /// Classifies a failed Google sign-in.
    ///
    /// Only messages from the auth service itself can point at missing setup.
    /// Transport failures are reported as plain failures.
    pub fn from_google(err: &BackendError) -> Self {
        let message = match err {
            BackendError::NotConfigured => return AuthError::not_configured(),
            BackendError::Api { message, .. } => message.as_str(),
            other => return AuthError::google_failed(&other.to_string()),
        };

        let setup = |message: &str| AuthError::NeedsSetup {
            message: message.to_string(),
        };
        if message.contains("not enabled") || message.contains("provider") {
            setup("Google Sign-In is not enabled in Supabase. Please contact the administrator to enable Google OAuth provider.")
        } else if message.contains("redirect") || message.contains("url") {
            setup("Google Sign-In redirect URL is not configured properly. Please contact the administrator.")
        } else if message.contains("client_id") || message.contains("client") {
            setup("Google OAuth client is not configured. Please contact the administrator to set up Google OAuth credentials.")
        } else {
            AuthError::google_failed(message)
        }
    }

    fn google_failed(message: &str) -> Self {
        AuthError::Rejected {
            message: format!("Google Sign-In failed: {message}. Please try again or contact support."),
        }
    }

    pub fn not_configured() -> Self {
        AuthError::NeedsSetup {
            message: "Supabase is not properly configured. Please set up your Supabase project first."
                .to_string(),
        }
    }

    pub fn needs_setup(&self) -> bool {
        matches!(self, AuthError::NeedsSetup { .. })
    }

    fn rejected(message: String, fallback: &str) -> Self {
        let message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        AuthError::Rejected { message }
    }
}
