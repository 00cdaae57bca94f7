//! Credential strategies and the shared authentication manager.

pub mod credential;
pub mod error;
pub mod manager;
pub mod oauth;

pub use credential::{ApiKeyCredential, BasicCredential, Credential};
pub use error::AuthError;
pub use manager::AuthManager;
pub use oauth::{
    AccessToken, HttpTokenFetcher, OAuthCredential, PasswordGrant, TokenFetcher, TokenGrant,
    TokenRequest,
};
