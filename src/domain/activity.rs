//! Append-only activity log entries and history queries.
//!
//! One [`ActivityLogEntry`] is written per successful category or product
//! mutation, inside the same unit of work as the mutation itself. Entries
//! carry a denormalized `entity_name` so history stays readable after the
//! entity is renamed or deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::ValidationError;
use super::{ActivityId, Actor, Category, Product, UserId};

/// Default history window in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;
/// Longest history window accepted, in days.
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Kind of mutation recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// Entity was created.
    Create,
    /// Entity was updated in place.
    Update,
    /// Entity was deleted.
    Delete,
}

impl ActivityAction {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(ValidationError::new(format!("unknown action: {other}"))),
        }
    }
}

/// Kind of entity a log entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A [`Category`].
    Category,
    /// A [`Product`].
    Product,
}

impl EntityType {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Product => "product",
        }
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Self::Category),
            "product" => Ok(Self::Product),
            other => Err(ValidationError::new(format!("unknown entity type: {other}"))),
        }
    }
}

/// An entity whose mutations are recorded in the activity log.
pub trait Audited {
    /// Entity kind.
    const ENTITY_TYPE: EntityType;

    /// Identifier as a raw UUID.
    fn entity_uuid(&self) -> uuid::Uuid;

    /// Current display name.
    fn entity_name(&self) -> &str;

    /// Field snapshot stored as old/new values.
    fn snapshot(&self) -> serde_json::Value;
}

impl Audited for Category {
    const ENTITY_TYPE: EntityType = EntityType::Category;

    fn entity_uuid(&self) -> uuid::Uuid {
        self.id.into()
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> serde_json::Value {
        Category::snapshot(self)
    }
}

impl Audited for Product {
    const ENTITY_TYPE: EntityType = EntityType::Product;

    fn entity_uuid(&self) -> uuid::Uuid {
        self.id.into()
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> serde_json::Value {
        Product::snapshot(self)
    }
}

/// Immutable record of one catalog mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    /// Entry identifier.
    pub id: ActivityId,
    /// What happened.
    pub action: ActivityAction,
    /// Kind of entity affected.
    pub entity_type: EntityType,
    /// Identifier of the entity affected.
    pub entity_id: uuid::Uuid,
    /// Entity name at the time of the action.
    pub entity_name: String,
    /// Snapshot before the mutation; absent for `create`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub old_values: Option<serde_json::Value>,
    /// Snapshot after the mutation; absent for `delete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub new_values: Option<serde_json::Value>,
    /// Acting user.
    pub user_id: UserId,
    /// Acting user's login name.
    pub user_name: String,
    /// When the mutation was applied.
    pub timestamp: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Entry for a newly created entity.
    #[must_use]
    pub fn created<T: Audited>(entity: &T, actor: &Actor, at: DateTime<Utc>) -> Self {
        Self::record(ActivityAction::Create, None, Some(entity), actor, at)
    }

    /// Entry for an update from `before` to `after`.
    #[must_use]
    pub fn updated<T: Audited>(before: &T, after: &T, actor: &Actor, at: DateTime<Utc>) -> Self {
        Self::record(ActivityAction::Update, Some(before), Some(after), actor, at)
    }

    /// Entry for a deleted entity.
    #[must_use]
    pub fn deleted<T: Audited>(entity: &T, actor: &Actor, at: DateTime<Utc>) -> Self {
        Self::record(ActivityAction::Delete, Some(entity), None, actor, at)
    }

    fn record<T: Audited>(
        action: ActivityAction,
        before: Option<&T>,
        after: Option<&T>,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Self {
        // The name the entity carries once this action has been applied,
        // or its last name when it no longer exists.
        let subject = after.or(before);
        Self {
            id: ActivityId::new(),
            action,
            entity_type: T::ENTITY_TYPE,
            entity_id: subject.map(Audited::entity_uuid).unwrap_or_default(),
            entity_name: subject
                .map(|e| e.entity_name().to_string())
                .unwrap_or_default(),
            old_values: before.map(Audited::snapshot),
            new_values: after.map(Audited::snapshot),
            user_id: actor.id,
            user_name: actor.username.clone(),
            timestamp: at,
        }
    }
}

/// Validated parameters for reading the activity history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    days: u32,
    action: Option<ActivityAction>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_HISTORY_DAYS,
            action: None,
        }
    }
}

impl HistoryQuery {
    /// Builds a query over the last `days` days, optionally narrowed to one
    /// action.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `days` is outside
    /// `1..=MAX_HISTORY_DAYS`.
    pub fn new(days: u32, action: Option<ActivityAction>) -> Result<Self, ValidationError> {
        if !(1..=MAX_HISTORY_DAYS).contains(&days) {
            return Err(ValidationError::new(format!(
                "timeRange must be between 1 and {MAX_HISTORY_DAYS} days"
            )));
        }
        Ok(Self { days, action })
    }

    /// Window length in days.
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Optional action filter.
    #[must_use]
    pub const fn action(&self) -> Option<ActivityAction> {
        self.action
    }

    /// Earliest timestamp included, relative to `now`.
    #[must_use]
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }

    /// Whether `entry` falls inside the window ending at `now`.
    #[must_use]
    pub fn includes(&self, entry: &ActivityLogEntry, now: DateTime<Utc>) -> bool {
        entry.timestamp >= self.since(now) && self.action.is_none_or(|a| a == entry.action)
    }
}
