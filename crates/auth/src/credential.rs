use crate::error::AuthError;
use crate::oauth::OAuthCredential;
use base64::{engine::general_purpose::STANDARD, Engine};
use now_mcp_core::ConfigError;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use std::fmt;

/// The single active credential of an [`AuthManager`](crate::AuthManager).
pub enum Credential {
    Basic(BasicCredential),
    OAuth(OAuthCredential),
    ApiKey(ApiKeyCredential),
}

impl Credential {
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Basic(_) => "basic",
            Credential::OAuth(_) => "oauth",
            Credential::ApiKey(_) => "api_key",
        }
    }

    /// The authentication header for the next outbound request.
    pub async fn authorization(&self) -> Result<(HeaderName, HeaderValue), AuthError> {
        match self {
            Credential::Basic(basic) => Ok((AUTHORIZATION, basic.header.clone())),
            Credential::ApiKey(key) => Ok((key.header_name.clone(), key.value.clone())),
            Credential::OAuth(oauth) => {
                let token = oauth.access_token().await?;
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("kind", &self.kind()).finish()
    }
}

/// Static `Authorization: Basic ...` credential.
pub struct BasicCredential {
    username: String,
    header: HeaderValue,
}

impl BasicCredential {
    pub fn new(username: &str, password: &str) -> Result<Self, ConfigError> {
        if username.is_empty() && password.is_empty() {
            return Err(ConfigError::Credential(
                "basic auth requires a username or password".to_string(),
            ));
        }
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        let mut header = HeaderValue::from_str(&format!("Basic {}", encoded))
            .map_err(|e| ConfigError::Credential(e.to_string()))?;
        header.set_sensitive(true);
        Ok(Self {
            username: username.to_string(),
            header,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Static API key sent in a custom header.
pub struct ApiKeyCredential {
    header_name: HeaderName,
    value: HeaderValue,
}

impl ApiKeyCredential {
    pub fn new(header_name: &str, key: &str) -> Result<Self, ConfigError> {
        if key.trim().is_empty() {
            return Err(ConfigError::Credential("API key is empty".to_string()));
        }
        let header_name = HeaderName::from_bytes(header_name.trim().as_bytes()).map_err(|e| {
            ConfigError::Credential(format!("invalid API key header '{}': {}", header_name, e))
        })?;
        let mut value =
            HeaderValue::from_str(key).map_err(|e| ConfigError::Credential(e.to_string()))?;
        value.set_sensitive(true);
        Ok(Self { header_name, value })
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }
}
