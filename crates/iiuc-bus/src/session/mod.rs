//! Per-request view of the signed-in user.
//!
//! A [`Session`] is built by the session middleware from the bearer token and
//! handed to handlers as a request extension.

mod cache;

pub use cache::{CacheStats, ProfileCache, SessionKey};

use crate::backend::{AuthUser, BackendError, HostedClient, Role, UserProfile};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Email address has not been confirmed")]
    Unconfirmed,

    /// Signed in with a role that may not use this dashboard
    #[error("This page is not available for the {role} role")]
    WrongRole { role: Role, redirect: &'static str },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SessionError {
    pub fn needs_reauth(&self) -> bool {
        match self {
            SessionError::MissingToken => true,
            SessionError::Backend(e) => e.needs_reauth(),
            _ => false,
        }
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
    pub profile: UserProfile,
}

impl Session {
    /// Resolves `token` into a session.
    ///
    /// Only confirmed accounts get a profile. The profile is read through
    /// `cache`, and created from the account metadata when it is missing.
    pub async fn resolve(
        client: &HostedClient,
        cache: &ProfileCache,
        token: &str,
    ) -> Result<Self, SessionError> {
        let user = client.get_user(token).await?;
        if !user.is_confirmed() {
            return Err(SessionError::Unconfirmed);
        }

        let key = SessionKey::from_token(token);
        if let Some(profile) = cache.get(&key).filter(|p| p.id == user.id) {
            debug!(session = %key, "Profile cache hit");
            return Ok(Self {
                access_token: token.to_string(),
                user,
                profile,
            });
        }

        let profile = match client.fetch_profile(token, &user.id).await? {
            Some(profile) => profile,
            None => {
                info!(user_id = %user.id, "No profile found for user");
                client.create_profile_from_auth(token, &user).await?
            }
        };

        info!(session = %key, role = %profile.role, "Session resolved");
        cache.insert(key, profile.clone());

        Ok(Self {
            access_token: token.to_string(),
            user,
            profile,
        })
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::from_token(&self.access_token)
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Fails unless the caller has `role`, pointing at their own dashboard.
    pub fn require_role(&self, role: Role) -> Result<(), SessionError> {
        if self.profile.role == role {
            Ok(())
        } else {
            Err(SessionError::WrongRole {
                role: self.profile.role,
                redirect: self.profile.role.dashboard_route(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Gender;
    use crate::settings::BackendSettings;

    fn session(role: Role) -> Session {
        Session {
            access_token: "jwt".to_string(),
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("t@iiuc.ac.bd".to_string()),
                email_confirmed_at: None,
                user_metadata: serde_json::Value::Null,
            },
            profile: UserProfile {
                id: "u1".to_string(),
                email: "t@iiuc.ac.bd".to_string(),
                name: "T".to_string(),
                university_id: "T001".to_string(),
                mobile: String::new(),
                gender: Gender::Male,
                role,
                created_at: None,
            },
        }
    }

    #[test]
    fn test_require_role() {
        assert!(session(Role::Teacher).require_role(Role::Teacher).is_ok());

        let err = session(Role::Student).require_role(Role::Admin).unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongRole {
                role: Role::Student,
                redirect: "/student-dashboard"
            }
        );
        assert!(!err.needs_reauth());
    }

    #[test]
    fn test_key_matches_token_hash() {
        assert_eq!(session(Role::Admin).key(), SessionKey::from_token("jwt"));
    }

    #[tokio::test]
    async fn test_resolve_offline() {
        let client = HostedClient::new(&BackendSettings::default()).unwrap();
        let err = Session::resolve(&client, &ProfileCache::default(), "jwt")
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Backend(BackendError::NotConfigured));
    }
}
