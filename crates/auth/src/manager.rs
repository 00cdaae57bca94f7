use crate::credential::{ApiKeyCredential, BasicCredential, Credential};
use crate::error::AuthError;
use crate::oauth::{HttpTokenFetcher, OAuthCredential, PasswordGrant, TokenFetcher, TokenRequest};
use now_mcp_core::{AuthConfig, ConfigError, ServerConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::sync::Arc;
use tracing::info;

/// Produces authenticated headers for every outbound platform request.
///
/// Built once at startup and shared by reference with the dispatcher and all
/// tool invocations.
#[derive(Debug)]
pub struct AuthManager {
    credential: Credential,
}

impl AuthManager {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Build from configuration, using the HTTP token endpoint for OAuth.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let fetcher = Arc::new(HttpTokenFetcher::new(config.timeout())?);
        Self::with_token_fetcher(config, fetcher)
    }

    /// Build from configuration with an explicit token fetcher.
    pub fn with_token_fetcher(
        config: &ServerConfig,
        fetcher: Arc<dyn TokenFetcher>,
    ) -> Result<Self, ConfigError> {
        let credential = match &config.auth {
            AuthConfig::Basic { username, password } => {
                Credential::Basic(BasicCredential::new(username, password)?)
            }
            AuthConfig::ApiKey {
                api_key,
                header_name,
            } => Credential::ApiKey(ApiKeyCredential::new(header_name, api_key)?),
            AuthConfig::OAuth {
                client_id,
                client_secret,
                token_url,
                username,
                password,
            } => {
                if client_id.trim().is_empty() || client_secret.trim().is_empty() {
                    return Err(ConfigError::Credential(
                        "OAuth requires client_id and client_secret".to_string(),
                    ));
                }
                let token_url = token_url
                    .clone()
                    .unwrap_or_else(|| format!("{}/oauth_token.do", config.instance_url));
                let password_grant = match (username, password) {
                    (Some(username), Some(password)) if !username.is_empty() => {
                        Some(PasswordGrant {
                            username: username.clone(),
                            password: password.clone(),
                        })
                    }
                    _ => None,
                };
                let request = TokenRequest {
                    token_url,
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    password_grant,
                };
                Credential::OAuth(OAuthCredential::new(request, fetcher))
            }
        };

        info!("Auth manager using {} credentials", credential.kind());
        Ok(Self::new(credential))
    }

    pub fn kind(&self) -> &'static str {
        self.credential.kind()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Headers for the next request. OAuth credentials refresh transparently.
    pub async fn get_headers(&self) -> Result<HeaderMap, AuthError> {
        let (name, value) = self.credential.authorization().await?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(name, value);
        Ok(headers)
    }
}
