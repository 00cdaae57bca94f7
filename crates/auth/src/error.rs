use thiserror::Error;

/// Failure to produce request headers. Recoverable: the next call retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Request(String),

    #[error("Token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed token response: {0}")]
    MalformedResponse(String),

    #[error("Token endpoint issued an already-expired token")]
    ExpiredToken,

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}
