use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration errors. Any of these stops the process before it serves.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Unsupported auth type: {0}")]
    UnsupportedAuthType(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Duplicate tool name '{name}' (groups '{first}' and '{second}')")]
    DuplicateTool {
        name: String,
        first: String,
        second: String,
    },
}
