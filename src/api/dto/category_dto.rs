//! Category DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Category;

/// Request body for `POST /categories` and `PUT /categories/{id}`.
///
/// Missing fields default to empty strings and fail validation with a
/// field-specific message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryRequest {
    /// Unique name, 2..50 characters after trimming.
    #[serde(default)]
    pub name: String,
    /// Description, 5..200 characters after trimming.
    #[serde(default)]
    pub description: String,
}

/// Response body for `DELETE /categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCategoryResponse {
    /// Outcome description.
    pub message: String,
    /// The category as it was when deleted.
    pub deleted_category: Category,
}

/// Response body for `POST /categories/seed`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    /// Outcome description.
    pub message: String,
    /// Categories created by this call.
    pub categories: Vec<Category>,
}
