//! HTTP client for the hosted auth and table service.
//!
//! Auth calls go to `/auth/v1/*` and table calls to `/rest/v1/{table}`. Every
//! request carries the project key in `apikey` and a bearer token, and every
//! call is bounded by a client-side timeout from the settings.

use super::error::BackendError;
use crate::settings::{BackendSettings, TimeoutSettings, PLACEHOLDER_BACKEND_URL};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Client for the hosted backend.
#[derive(Debug, Clone)]
pub struct HostedClient {
    http: Client,
    /// `None` when running in offline mode.
    base_url: Option<Url>,
    anon_key: String,
    site_url: String,
    timeouts: TimeoutSettings,
}

impl HostedClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackendError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let base_url = if is_configured(settings) {
            Some(Url::parse(settings.url.trim())?)
        } else {
            warn!("Hosted backend credentials missing, running in offline mode");
            None
        };

        Ok(Self {
            http,
            base_url,
            anon_key: settings.anon_key.clone(),
            site_url: settings.site_url.trim_end_matches('/').to_string(),
            timeouts: settings.timeouts.clone(),
        })
    }

    /// Returns false in offline mode.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn timeouts(&self) -> &TimeoutSettings {
        &self.timeouts
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Joins `path` onto the backend URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.base_url.as_ref().ok_or(BackendError::NotConfigured)?;
        Ok(base.join(path)?)
    }

    /// URL for a table with PostgREST query parameters.
    pub(crate) fn table_url(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("/rest/v1/{table}"))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Starts a request with the project key and a bearer token.
    ///
    /// Without a user token the project key is used as the bearer.
    pub(crate) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    /// Sends `request` and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        limit: Duration,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        with_timeout(operation, limit, async {
            let response = check_status(request.send().await?).await?;
            Ok::<_, BackendError>(response.json::<T>().await?)
        })
        .await
    }

    /// Sends `request` and discards the body.
    pub(crate) async fn send_empty(
        &self,
        operation: &'static str,
        limit: Duration,
        request: RequestBuilder,
    ) -> Result<(), BackendError> {
        with_timeout(operation, limit, async {
            check_status(request.send().await?).await?;
            Ok::<_, BackendError>(())
        })
        .await
    }
}

fn is_configured(settings: &BackendSettings) -> bool {
    let url = settings.url.trim();
    !url.is_empty() && !settings.anon_key.trim().is_empty() && url != PLACEHOLDER_BACKEND_URL
}

/// Runs `call`, failing with [`BackendError::Timeout`] after `limit`.
pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation,
                limit_ms = limit.as_millis() as u64,
                "Hosted backend call timed out"
            );
            Err(BackendError::Timeout { operation })
        }
    }
}

/// Turns an error status into [`BackendError::Api`].
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    debug!(status = status.as_u16(), message = %message, "Hosted backend returned error");

    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pulls the human-readable message out of an auth or table error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str, key: &str) -> BackendSettings {
        BackendSettings {
            url: url.to_string(),
            anon_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_offline_mode_detection() {
        assert!(!HostedClient::new(&settings("", "key")).unwrap().is_configured());
        assert!(!HostedClient::new(&settings("https://abc.supabase.co", "")).unwrap().is_configured());
        assert!(!HostedClient::new(&settings(PLACEHOLDER_BACKEND_URL, "key"))
            .unwrap()
            .is_configured());
        assert!(HostedClient::new(&settings("https://abc.supabase.co", "key"))
            .unwrap()
            .is_configured());
    }

    #[test]
    fn test_endpoint_requires_configuration() {
        let client = HostedClient::new(&BackendSettings::default()).unwrap();
        assert_eq!(
            client.endpoint("/auth/v1/user").unwrap_err(),
            BackendError::NotConfigured
        );
    }

    #[test]
    fn test_table_url() {
        let client = HostedClient::new(&settings("https://abc.supabase.co", "key")).unwrap();
        let url = client
            .table_url(
                "users",
                &[
                    ("select", "*".to_string()),
                    ("university_id", "eq.C231045".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/users?select=*&university_id=eq.C231045"
        );
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            error_message(r#"{"code":400,"msg":"Email not confirmed"}"#),
            Some("Email not confirmed".to_string())
        );
        assert_eq!(
            error_message(r#"{"code":"PGRST116","message":"JSON object requested"}"#),
            Some("JSON object requested".to_string())
        );
        assert_eq!(error_message("not json"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_elapses() {
        let result: Result<(), _> = with_timeout("Session check", Duration::from_secs(8), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BackendError>(())
        })
        .await;
        assert_eq!(
            result.unwrap_err(),
            BackendError::Timeout {
                operation: "Session check"
            }
        );
    }
}
