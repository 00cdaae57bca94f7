use now_mcp_auth::AuthManager;
use now_mcp_core::{ConfigError, ServerConfig};
use std::sync::Arc;

/// Everything a tool needs to reach the platform. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthManager>,
    pub http: reqwest::Client,
}

impl ToolContext {
    /// Fails if the HTTP client cannot be built with the configured timeout.
    pub fn new(config: Arc<ServerConfig>, auth: Arc<AuthManager>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { config, auth, http })
    }
}
