//! Process configuration loader.
//!
//! Settings come from an optional YAML file and from `SERVICENOW_*` /
//! `MCP_*` environment variables. Environment values win over the file.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_KEY_HEADER: &str = "X-ServiceNow-API-Key";
pub const DEFAULT_PACKAGE_CONFIG_PATH: &str = "config/tool_packages.yaml";
const REDACTED: &str = "***";

/// Credential settings for the active auth strategy.
///
/// `Debug` output masks passwords, client secrets and API keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    Basic {
        username: String,
        password: String,
    },
    #[serde(rename = "oauth")]
    OAuth {
        client_id: String,
        client_secret: String,
        token_url: Option<String>,
        /// Enables the password-grant fallback when both are set.
        username: Option<String>,
        password: Option<String>,
    },
    ApiKey {
        api_key: String,
        header_name: String,
    },
}

impl AuthConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::OAuth { .. } => "oauth",
            AuthConfig::ApiKey { .. } => "api_key",
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            AuthConfig::OAuth {
                client_id,
                token_url,
                username,
                password,
                ..
            } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .field("client_secret", &REDACTED)
                .field("token_url", token_url)
                .field("username", username)
                .field("password", &redact(password))
                .finish(),
            AuthConfig::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &REDACTED)
                .field("header_name", header_name)
                .finish(),
        }
    }
}

/// Immutable server configuration shared by every tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Instance base URL without a trailing slash.
    pub instance_url: String,
    pub auth: AuthConfig,
    pub timeout_secs: u64,
    pub debug: bool,
    /// Selected capability package. `None` selects every registered tool.
    pub tool_package: Option<String>,
    pub package_config_path: PathBuf,
}

impl ServerConfig {
    /// Base of the REST API, e.g. `https://dev1.service-now.com/api/now`.
    pub fn api_url(&self) -> String {
        format!("{}/api/now", self.instance_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from the process environment, optionally layered over a YAML file.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let raw = match file {
            Some(path) => RawConfig::from_file(path)?,
            None => RawConfig::default(),
        };
        raw.with_env(|key| std::env::var(key).ok()).build()
    }

    /// Build from an arbitrary key lookup. Keys are the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        RawConfig::default().with_env(lookup).build()
    }
}

/// Flat, all-optional view of the settings before validation.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    instance_url: Option<String>,
    auth_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: Option<String>,
    api_key: Option<String>,
    api_key_header: Option<String>,
    timeout: Option<u64>,
    debug: Option<bool>,
    tool_package: Option<String>,
    package_config_path: Option<PathBuf>,
}

impl fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawConfig")
            .field("instance_url", &self.instance_url)
            .field("auth_type", &self.auth_type)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("token_url", &self.token_url)
            .field("api_key", &redact(&self.api_key))
            .field("api_key_header", &self.api_key_header)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("tool_package", &self.tool_package)
            .field("package_config_path", &self.package_config_path)
            .finish()
    }
}

impl RawConfig {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        override_with(&mut self.instance_url, get("SERVICENOW_INSTANCE_URL"));
        override_with(&mut self.auth_type, get("SERVICENOW_AUTH_TYPE"));
        override_with(&mut self.username, get("SERVICENOW_USERNAME"));
        override_with(&mut self.password, get("SERVICENOW_PASSWORD"));
        override_with(&mut self.client_id, get("SERVICENOW_CLIENT_ID"));
        override_with(&mut self.client_secret, get("SERVICENOW_CLIENT_SECRET"));
        override_with(&mut self.token_url, get("SERVICENOW_TOKEN_URL"));
        override_with(&mut self.api_key, get("SERVICENOW_API_KEY"));
        override_with(&mut self.api_key_header, get("SERVICENOW_API_KEY_HEADER"));
        override_with(&mut self.tool_package, get("MCP_TOOL_PACKAGE"));
        override_with(
            &mut self.package_config_path,
            get("TOOL_PACKAGE_CONFIG_PATH").map(PathBuf::from),
        );

        // Unparseable timeouts become 0, which `build` rejects.
        if let Some(raw) = get("SERVICENOW_TIMEOUT") {
            self.timeout = Some(raw.trim().parse().unwrap_or(0));
        }
        if let Some(raw) = get("SERVICENOW_DEBUG") {
            self.debug = Some(parse_flag(&raw));
        }
        self
    }

    fn build(self) -> Result<ServerConfig, ConfigError> {
        let instance_url = self
            .instance_url
            .ok_or(ConfigError::Missing("SERVICENOW_INSTANCE_URL"))?;
        let instance_url = instance_url.trim().trim_end_matches('/').to_string();
        if !(instance_url.starts_with("https://") || instance_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "SERVICENOW_INSTANCE_URL",
                reason: format!("expected an http(s) URL, got '{}'", instance_url),
            });
        }

        let auth_type = self
            .auth_type
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "basic".to_string());

        let auth = match auth_type.as_str() {
            "basic" => AuthConfig::Basic {
                username: self.username.unwrap_or_default(),
                password: self.password.unwrap_or_default(),
            },
            "oauth" => AuthConfig::OAuth {
                client_id: self
                    .client_id
                    .ok_or(ConfigError::Missing("SERVICENOW_CLIENT_ID"))?,
                client_secret: self
                    .client_secret
                    .ok_or(ConfigError::Missing("SERVICENOW_CLIENT_SECRET"))?,
                token_url: self.token_url,
                username: self.username,
                password: self.password,
            },
            "api_key" | "apikey" => AuthConfig::ApiKey {
                api_key: self.api_key.ok_or(ConfigError::Missing("SERVICENOW_API_KEY"))?,
                header_name: self
                    .api_key_header
                    .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            },
            other => return Err(ConfigError::UnsupportedAuthType(other.to_string())),
        };

        let timeout_secs = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "SERVICENOW_TIMEOUT",
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        let tool_package = self
            .tool_package
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let config = ServerConfig {
            instance_url,
            auth,
            timeout_secs,
            debug: self.debug.unwrap_or(false),
            tool_package,
            package_config_path: self
                .package_config_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_CONFIG_PATH)),
        };
        debug!(
            "Loaded config for {} (auth: {})",
            config.instance_url,
            config.auth.kind()
        );
        Ok(config)
    }
}

fn override_with<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
