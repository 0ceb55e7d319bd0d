//! Account operations: password sign-in, sign-up, sign-out and Google OAuth.

use super::client::HostedClient;
use super::error::{AuthError, BackendError};
use super::types::{AuthSession, AuthUser, ProfileDetails, Role, SignUpOutcome};
use crate::schedule::Gender;
use regex::Regex;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::{info, warn};
use url::Url;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Registration form as submitted by the web app.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub university_id: String,
    pub mobile: String,
    pub gender: Gender,
    pub role: Role,
}

impl SignUpForm {
    /// Checks the form in the order the web app reports problems.
    pub fn validate(&self) -> Result<(), AuthError> {
        let invalid = |message: &str| Err(AuthError::Validation(message.to_string()));

        let required = [
            &self.name,
            &self.email,
            &self.university_id,
            &self.mobile,
            &self.password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return invalid("Please fill in all required fields");
        }
        if self.password != self.confirm_password {
            return invalid("Passwords do not match");
        }
        if self.password.chars().count() < 6 {
            return invalid("Password must be at least 6 characters long");
        }
        if !EMAIL_REGEX.is_match(&self.email) {
            return invalid("Please enter a valid email address");
        }
        if self.university_id.chars().count() < 3 {
            return invalid("University ID must be at least 3 characters long");
        }
        Ok(())
    }

    fn details(&self) -> ProfileDetails {
        ProfileDetails {
            name: self.name.clone(),
            university_id: self.university_id.clone(),
            mobile: self.mobile.clone(),
            gender: self.gender,
            role: self.role,
        }
    }
}

impl HostedClient {
    /// Signs in with an email or a university ID.
    ///
    /// The identifier is first tried as an email. If that is rejected as
    /// invalid credentials, the identifier is looked up as a university ID
    /// and the sign-in is retried with the email found.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<AuthSession, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation("Please fill in all fields".to_string()));
        }

        info!(identifier = %identifier, "Attempting sign-in");

        let result = match self.password_grant(identifier, password).await {
            Err(e) if e.to_string().contains("Invalid login credentials") => {
                info!("Email sign-in failed, trying university ID lookup");
                match self.lookup_email_by_university_id(identifier).await {
                    Ok(Some(email)) => self.password_grant(&email, password).await,
                    Ok(None) => Err(e),
                    Err(lookup_err) => {
                        warn!(error = %lookup_err, "University ID lookup failed");
                        Err(e)
                    }
                }
            }
            other => other,
        };

        match result {
            Ok(session) => {
                info!(user_id = %session.user.id, "Sign-in successful");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                Err(AuthError::from_sign_in(&e))
            }
        }
    }

    async fn password_grant(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }));
        self.send_json("Sign-in", self.timeouts().sign_in(), request)
            .await
    }

    /// Registers a new account with the profile stored as metadata.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpOutcome, AuthError> {
        form.validate()?;
        info!(email = %form.email, "Signing up user");

        let body: Value = self
            .sign_up_request(form)
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-up failed");
                AuthError::from_sign_up(&e)
            })?;

        let outcome = parse_sign_up(body).map_err(|e| AuthError::from_sign_up(&e))?;
        info!(
            needs_confirmation = matches!(outcome, SignUpOutcome::NeedsConfirmation { .. }),
            "Sign-up complete"
        );
        Ok(outcome)
    }

    async fn sign_up_request(&self, form: &SignUpForm) -> Result<Value, BackendError> {
        let mut url = self.endpoint("/auth/v1/signup")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", &format!("{}/login", self.site_url()));

        let request = self.request(Method::POST, url, None).json(&json!({
            "email": form.email,
            "password": form.password,
            "data": form.details(),
        }));
        self.send_json("Sign-up", self.timeouts().sign_in(), request)
            .await
    }

    /// Ends the session behind `token`.
    pub async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("/auth/v1/logout")?;
        let request = self.request(Method::POST, url, Some(token));
        self.send_empty("Sign-out", self.timeouts().session(), request)
            .await
    }

    /// Returns the account behind `token`.
    pub async fn get_user(&self, token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("/auth/v1/user")?;
        let request = self.request(Method::GET, url, Some(token));
        self.send_json("Session", self.timeouts().session(), request)
            .await
    }

    /// Builds the URL that starts the Google OAuth flow.
    ///
    /// The provider settings are checked first so a disabled provider is
    /// reported before the user is sent away.
    pub async fn google_sign_in_url(&self) -> Result<Url, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::not_configured());
        }

        let enabled = self
            .google_enabled()
            .await
            .map_err(|e| AuthError::from_google(&e))?;
        if !enabled {
            return Err(AuthError::from_google(&BackendError::Api {
                status: 400,
                message: "Unsupported provider: provider is not enabled".to_string(),
            }));
        }

        let mut url = self
            .endpoint("/auth/v1/authorize")
            .map_err(|e| AuthError::from_google(&e))?;
        url.query_pairs_mut()
            .append_pair("provider", "google")
            .append_pair("redirect_to", &format!("{}/login?google=success", self.site_url()))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    async fn google_enabled(&self) -> Result<bool, BackendError> {
        let url = self.endpoint("/auth/v1/settings")?;
        let request = self.request(Method::GET, url, None);
        let settings: Value = self
            .send_json("Auth settings", self.timeouts().session(), request)
            .await?;
        Ok(settings
            .pointer("/external/google")
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

/// Sign-up answers with a session when no confirmation is required and with
/// the bare account otherwise.
fn parse_sign_up(body: Value) -> Result<SignUpOutcome, BackendError> {
    let decode = |e: serde_json::Error| BackendError::Decode {
        message: e.to_string(),
    };

    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body).map_err(decode)?;
        return Ok(SignUpOutcome::SignedIn { session });
    }

    let user: AuthUser = match body.get("user") {
        Some(user) if !user.is_null() => serde_json::from_value(user.clone()).map_err(decode)?,
        _ => serde_json::from_value(body).map_err(decode)?,
    };
    Ok(SignUpOutcome::NeedsConfirmation { user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BackendSettings;

    fn form() -> SignUpForm {
        SignUpForm {
            email: "karim@ugrad.iiuc.ac.bd".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            name: "Karim".to_string(),
            university_id: "C231001".to_string(),
            mobile: "01800000000".to_string(),
            gender: Gender::Male,
            role: Role::Student,
        }
    }

    fn rejected(form: SignUpForm) -> String {
        form.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_form_validation_order() {
        let mut f = form();
        f.mobile = "  ".to_string();
        f.password = "x".to_string();
        assert_eq!(rejected(f), "Please fill in all required fields");

        let mut f = form();
        f.confirm_password = "secret2".to_string();
        assert_eq!(rejected(f), "Passwords do not match");

        let mut f = form();
        f.password = "abc".to_string();
        f.confirm_password = "abc".to_string();
        assert_eq!(rejected(f), "Password must be at least 6 characters long");

        let mut f = form();
        f.email = "karim@iiuc".to_string();
        assert_eq!(rejected(f), "Please enter a valid email address");

        let mut f = form();
        f.university_id = "C2".to_string();
        assert_eq!(rejected(f), "University ID must be at least 3 characters long");
    }

    #[test]
    fn test_parse_sign_up_shapes() {
        let pending = parse_sign_up(json!({
            "id": "u1",
            "email": "karim@ugrad.iiuc.ac.bd",
            "user_metadata": { "name": "Karim" }
        }))
        .unwrap();
        assert!(matches!(pending, SignUpOutcome::NeedsConfirmation { ref user } if user.id == "u1"));

        let signed_in = parse_sign_up(json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "u2", "email_confirmed_at": "2024-05-01T10:00:00Z" }
        }))
        .unwrap();
        match signed_in {
            SignUpOutcome::SignedIn { session } => {
                assert_eq!(session.access_token, "jwt");
                assert!(session.user.is_confirmed());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_offline_sign_in_needs_setup() {
        let client = HostedClient::new(&BackendSettings::default()).unwrap();
        let err = client.sign_in("C231001", "secret1").await.unwrap_err();
        assert!(err.needs_setup());

        let err = client.google_sign_in_url().await.unwrap_err();
        assert!(err.needs_setup());
    }

    #[tokio::test]
    async fn test_empty_identifier_rejected() {
        let client = HostedClient::new(&BackendSettings::default()).unwrap();
        let err = client.sign_in("  ", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
    }
}
