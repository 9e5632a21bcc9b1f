//! In-process session gate over a fixed set of accounts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::{AuthError, IdentityGate, Session};
use crate::config::BootstrapUser;
use crate::domain::{Actor, UserId};

/// Namespace for deriving stable user ids from usernames.
const USER_NAMESPACE: Uuid = Uuid::from_u128(0x6b1c_2f0e_93a4_4c55_8d27_51e0_7a3f_c2d9);

struct Account {
    actor: Actor,
    password_hash: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("actor", &self.actor).finish_non_exhaustive()
    }
}

/// Identity gate with Argon2id-hashed accounts and opaque UUID tokens.
///
/// Sessions live in memory and expire after the configured TTL. Expired
/// sessions are pruned whenever a new one is opened.
#[derive(Debug)]
pub struct SessionGate {
    accounts: HashMap<String, Account>,
    /// Verified against on unknown usernames so both rejections cost one
    /// Argon2 run.
    dummy_hash: Option<String>,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionGate {
    /// Creates a gate with no accounts.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            accounts: HashMap::new(),
            dummy_hash: None,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Creates a gate provisioned with `users`.
    ///
    /// User ids are derived from usernames, so they stay stable across
    /// restarts and activity log entries keep pointing at the same user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if a password cannot be hashed.
    pub fn with_users(users: &[BootstrapUser], ttl: Duration) -> Result<Self, AuthError> {
        let mut gate = Self::new(ttl);
        if !users.is_empty() {
            let filler = Uuid::new_v4().simple().to_string();
            gate.dummy_hash =
                Some(hash_password(&filler).map_err(|e| AuthError::Internal(e.to_string()))?);
        }
        for user in users {
            let password_hash = hash_password(&user.password)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            let actor = Actor {
                id: UserId::from_uuid(Uuid::new_v5(&USER_NAMESPACE, user.username.as_bytes())),
                username: user.username.clone(),
                role: user.role,
            };
            gate.accounts.insert(
                user.username.clone(),
                Account {
                    actor,
                    password_hash,
                },
            );
        }
        tracing::info!(accounts = gate.accounts.len(), "identity gate provisioned");
        Ok(gate)
    }

    /// Opens a session for an actor whose identity is already established.
    pub async fn issue_session(&self, actor: Actor) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user: actor,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        session
    }
}

#[async_trait]
impl IdentityGate for SessionGate {
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = self.accounts.get(username.trim());
        let hash = match (account, &self.dummy_hash) {
            (Some(account), _) => account.password_hash.clone(),
            (None, Some(dummy)) => dummy.clone(),
            (None, None) => return Err(AuthError::InvalidCredentials),
        };

        let candidate = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let Some(account) = account.filter(|_| verified) else {
            tracing::warn!(username, known = account.is_some(), "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let session = self.issue_session(account.actor.clone()).await;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "user logged in");
        Ok(session)
    }

    async fn current_user(&self, token: &str) -> Result<Actor, AuthError> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.user.clone()),
            _ => Err(AuthError::InvalidToken),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if let Some(session) = self.sessions.write().await.remove(token) {
            tracing::info!(user_id = %session.user.id, "user logged out");
        }
        Ok(())
    }
}
