//! Identity gate: resolves bearer credentials to the request [`Actor`].
//!
//! The catalog only consumes [`IdentityGate::current_user`]; how
//! credentials are verified is the gate's concern. [`SessionGate`] is the
//! bundled implementation backed by startup-provisioned accounts.

pub mod password;
pub mod session;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Actor;

pub use session::SessionGate;

/// Failures reported by an [`IdentityGate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Username unknown or password wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No `Authorization: Bearer` header was sent.
    #[error("missing bearer token")]
    MissingToken,

    /// The token is unknown, revoked, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Credential processing failed on the server side.
    #[error("credential processing failed: {0}")]
    Internal(String),
}

/// An open bearer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// The signed-in user.
    pub user: Actor,
    /// Instant after which the token stops resolving.
    pub expires_at: DateTime<Utc>,
}

/// Credential resolution capability consumed by the API layer.
#[async_trait]
pub trait IdentityGate: Send + Sync + fmt::Debug {
    /// Verifies credentials and opens a session.
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// Resolves a bearer token to its user.
    async fn current_user(&self, token: &str) -> Result<Actor, AuthError>;

    /// Revokes a token. Unknown tokens are ignored.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}
