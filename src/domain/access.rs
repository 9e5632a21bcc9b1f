//! Roles, the request actor, and the single authorization policy.
//!
//! | Role    | create / update | delete | read |
//! |---------|-----------------|--------|------|
//! | admin   | yes             | yes    | yes  |
//! | manager | yes             | no     | yes  |
//! | staff   | no              | no     | yes  |
//!
//! Seeding the sample categories is reserved for admins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control, including deletes.
    Admin,
    /// May create and update, never delete.
    Manager,
    /// Read-only.
    Staff,
}

impl Role {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }

    /// Whether this role may perform `action`.
    #[must_use]
    pub const fn permits(self, action: CatalogAction) -> bool {
        match action {
            CatalogAction::Read => true,
            CatalogAction::Create | CatalogAction::Update => {
                matches!(self, Self::Admin | Self::Manager)
            }
            CatalogAction::Delete | CatalogAction::Seed => matches!(self, Self::Admin),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Operation class checked against the role matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    /// Any read of catalog or reports.
    Read,
    /// Creating a category or product.
    Create,
    /// Updating a category or product.
    Update,
    /// Deleting a category or product.
    Delete,
    /// Loading the sample categories.
    Seed,
}

impl CatalogAction {
    const fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Seed => "seed",
        }
    }
}

/// The resolved user on whose behalf a request runs.
///
/// Built once per request from the bearer credential and passed explicitly
/// into every service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// User identifier.
    pub id: UserId,
    /// Login name, denormalized into activity log entries.
    pub username: String,
    /// Role used for authorization.
    pub role: Role,
}

/// The actor's role does not permit the requested action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role '{role}' may not {verb} catalog entries", verb = .action.verb())]
pub struct AccessDenied {
    /// Role that was checked.
    pub role: Role,
    /// Action that was refused.
    pub action: CatalogAction,
}

/// Checks `action` against the role matrix.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the actor's role does not permit `action`.
pub fn authorize(actor: &Actor, action: CatalogAction) -> Result<(), AccessDenied> {
    if actor.role.permits(action) {
        Ok(())
    } else {
        Err(AccessDenied {
            role: actor.role,
            action,
        })
    }
}
