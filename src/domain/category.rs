//! Category records and their validated drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CategoryId;
use super::validation::{ValidationError, trimmed_within};

/// Minimum category name length after trimming.
pub const NAME_MIN: usize = 2;
/// Maximum category name length after trimming.
pub const NAME_MAX: usize = 50;
/// Minimum category description length after trimming.
pub const DESCRIPTION_MIN: usize = 5;
/// Maximum category description length after trimming.
pub const DESCRIPTION_MAX: usize = 200;

/// A stored product category.
///
/// `name` is unique across the catalog (exact match on the trimmed value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Generated identifier.
    pub id: CategoryId,
    /// Unique display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Server-assigned time of the last update.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Materializes a new category from a validated draft.
    #[must_use]
    pub fn create(draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: CategoryId::new(),
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the draft's fields applied and `updated_at` bumped.
    #[must_use]
    pub fn updated(&self, draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            name: draft.name,
            description: draft.description,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    /// JSON snapshot recorded in the activity log.
    #[must_use]
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
        })
    }
}

/// Validated input for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    name: String,
    description: String,
}

impl CategoryDraft {
    /// Trims and validates raw input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name is outside
    /// `NAME_MIN..=NAME_MAX` or the description outside
    /// `DESCRIPTION_MIN..=DESCRIPTION_MAX` characters.
    pub fn new(name: &str, description: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: trimmed_within("name", name, NAME_MIN, NAME_MAX)?,
            description: trimmed_within(
                "description",
                description,
                DESCRIPTION_MIN,
                DESCRIPTION_MAX,
            )?,
        })
    }

    /// Trimmed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
