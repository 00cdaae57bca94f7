//! Shared configuration and error types for the now-mcp bridge.

pub mod config;
pub mod error;

pub use config::{AuthConfig, ServerConfig, DEFAULT_API_KEY_HEADER, DEFAULT_PACKAGE_CONFIG_PATH};
pub use error::ConfigError;
