use crate::schema::FieldError;
use now_mcp_auth::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure category carried by a failed [`ToolResult`](crate::ToolResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolNotFound,
    Validation,
    Authentication,
    RemoteCall,
    Timeout,
    Internal,
}

/// Failure talking to the remote platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteCallError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteCallError::Timeout
        } else {
            RemoteCallError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {}", join_field_errors(.0))]
    InvalidArguments(Vec<FieldError>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("Remote call failed: {0}")]
    Remote(#[from] RemoteCallError),

    #[error("Tool execution timed out after {0}ms")]
    Timeout(u128),

    #[error("Internal error")]
    Internal,
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::NotFound(_) => ErrorKind::ToolNotFound,
            ToolError::InvalidArguments(_) | ToolError::Validation(_) => ErrorKind::Validation,
            ToolError::Authentication(_) => ErrorKind::Authentication,
            ToolError::Remote(_) => ErrorKind::RemoteCall,
            ToolError::Timeout(_) => ErrorKind::Timeout,
            ToolError::Internal => ErrorKind::Internal,
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
