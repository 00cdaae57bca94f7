//! OAuth2 client-credentials strategy with in-place token refresh.

use crate::error::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use now_mcp_core::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Refresh this long before the token actually expires.
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 60;
/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 1800;
const MAX_EXPIRES_IN_SECS: u64 = 365 * 24 * 3600;
const MAX_ERROR_BODY: usize = 512;

/// Resource-owner credentials used when the client-credentials grant is refused.
#[derive(Clone)]
pub struct PasswordGrant {
    pub username: String,
    pub password: String,
}

/// Everything needed to ask the token endpoint for a new access token.
#[derive(Clone)]
pub struct TokenRequest {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub password_grant: Option<PasswordGrant>,
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("password_grant", &self.password_grant.is_some())
            .finish()
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Performs the HTTP exchange with the token endpoint.
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    async fn fetch(&self, request: &TokenRequest) -> Result<TokenGrant, AuthError>;
}

/// An access token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

pub struct OAuthCredential {
    request: TokenRequest,
    safety_margin: Duration,
    fetcher: Arc<dyn TokenFetcher>,
    token: Mutex<Option<AccessToken>>,
}

impl OAuthCredential {
    pub fn new(request: TokenRequest, fetcher: Arc<dyn TokenFetcher>) -> Self {
        Self {
            request,
            safety_margin: Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS),
            fetcher,
            token: Mutex::new(None),
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn token_url(&self) -> &str {
        &self.request.token_url
    }

    /// Snapshot of the cached token, if any.
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    /// Returns a usable access token, refreshing it first when it is missing or
    /// inside the safety margin.
    ///
    /// Check, refresh and store happen under one lock, so concurrent callers
    /// racing an expiring token trigger a single refresh. The previous token is
    /// dropped before refreshing and is never served after a failed refresh.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if Utc::now() < token.expires_at - self.safety_margin {
                return Ok(token.value.clone());
            }
        }

        let previous = slot.take();
        debug!(
            "Refreshing OAuth token from {} (had token: {})",
            self.request.token_url,
            previous.is_some()
        );

        let grant = self.fetcher.fetch(&self.request).await.map_err(|e| {
            warn!("OAuth token refresh failed: {}", e);
            e
        })?;

        let issued_at = Utc::now();
        let lifetime = grant.expires_in.min(MAX_EXPIRES_IN_SECS);
        let expires_at = issued_at + Duration::seconds(lifetime as i64);
        if expires_at <= issued_at {
            warn!("Token endpoint returned a token with expires_in=0");
            return Err(AuthError::ExpiredToken);
        }

        let value = grant.access_token;
        *slot = Some(AccessToken {
            value: value.clone(),
            expires_at,
        });
        debug!("OAuth token refreshed, expires at {}", expires_at);
        Ok(value)
    }
}

/// reqwest-backed [`TokenFetcher`] posting form-encoded grants.
pub struct HttpTokenFetcher {
    client: reqwest::Client,
}

impl HttpTokenFetcher {
    pub fn new(timeout: std::time::Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    async fn request_grant(
        &self,
        token_url: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenGrant, AuthError> {
        let response = self
            .client
            .post(token_url)
            .header("Accept", "application/json")
            .form(params)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let grant: TokenGrant = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if grant.access_token.trim().is_empty() {
            return Err(AuthError::MalformedResponse(
                "empty access_token".to_string(),
            ));
        }
        Ok(grant)
    }
}

#[async_trait]
impl TokenFetcher for HttpTokenFetcher {
    async fn fetch(&self, request: &TokenRequest) -> Result<TokenGrant, AuthError> {
        let client_credentials = [
            ("grant_type", "client_credentials"),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
        ];

        match self.request_grant(&request.token_url, &client_credentials).await {
            Ok(grant) => Ok(grant),
            Err(err @ AuthError::Status { .. }) => {
                let Some(password_grant) = &request.password_grant else {
                    return Err(err);
                };
                warn!(
                    "client_credentials grant failed ({}), retrying with password grant",
                    err
                );
                let params = [
                    ("grant_type", "password"),
                    ("client_id", request.client_id.as_str()),
                    ("client_secret", request.client_secret.as_str()),
                    ("username", password_grant.username.as_str()),
                    ("password", password_grant.password.as_str()),
                ];
                self.request_grant(&request.token_url, &params).await
            }
            Err(err) => Err(err),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
