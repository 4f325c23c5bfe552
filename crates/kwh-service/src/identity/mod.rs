//! Identity provider integration.
//!
//! The service never stores credentials. It verifies ID tokens issued by the
//! identity provider and uses the provider's admin API to look up accounts
//! and change passwords.

pub mod firebase;

use async_trait::async_trait;

pub use firebase::{FirebaseIdentity, ServiceAccountKey};

/// Claims extracted from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Provider user ID (`sub`).
    pub uid: String,
    /// Email claim, when present.
    pub email: Option<String>,
}

/// An account as reported by the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Provider user ID.
    pub uid: String,
    /// Primary email.
    pub email: Option<String>,
    /// Whether the account is disabled.
    pub disabled: bool,
    /// Tokens issued before this Unix time are revoked.
    pub valid_since: Option<i64>,
}

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The token failed validation or has been revoked.
    #[error("{0}")]
    InvalidToken(String),

    /// The account does not exist.
    #[error("no user record found for {0}")]
    UserNotFound(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error response.
    #[error("identity provider error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Local configuration problem (bad key, missing project).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Operations the service needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an ID token, including revocation status.
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, IdentityError>;

    /// Look up an account by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, IdentityError>;

    /// Look up an account by user ID.
    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>, IdentityError>;

    /// Set a new password for an account.
    async fn update_password(&self, uid: &str, password: &str) -> Result<(), IdentityError>;
}
