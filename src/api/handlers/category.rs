//! Category handlers: list, get, create, update, delete, seed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CategoryRequest, DeletedCategoryResponse, SeedResponse};
use crate::api::extract::{ApiJson, CurrentUser};
use crate::app_state::AppState;
use crate::domain::{Category, CategoryId};
use crate::error::{CatalogError, ErrorResponse};

fn category_id(raw: &str) -> Result<CategoryId, CatalogError> {
    raw.parse()
        .map_err(|_| CatalogError::Invalid(format!("invalid category id: '{raw}'")))
}

/// `GET /categories`: List all categories.
///
/// # Errors
///
/// Returns [`CatalogError`] on authentication or storage failure.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    summary = "List categories",
    description = "Returns every category, oldest first.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, CatalogError> {
    let categories = state.catalog.list_categories(&user.actor).await?;
    Ok(Json(categories))
}

/// `GET /categories/{id}`: Get one category.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the category does not exist.
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    summary = "Get category",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found", body = ErrorResponse),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let category = state.catalog.get_category(&user.actor, category_id(&id)?).await?;
    Ok(Json(category))
}

/// `POST /categories`: Create a category.
///
/// # Errors
///
/// Returns [`CatalogError`] for staff callers, invalid fields, or a
/// duplicate name.
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    summary = "Create category",
    description = "Requires the manager or admin role. Names are unique after trimming.",
    security(("bearer_auth" = [])),
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let category = state
        .catalog
        .create_category(&user.actor, &req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /categories/{id}`: Replace a category's name and description.
///
/// # Errors
///
/// Returns [`CatalogError`] for staff callers, invalid fields, an unknown
/// id, or a duplicate name.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    summary = "Update category",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Category UUID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse),
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let category = state
        .catalog
        .update_category(&user.actor, category_id(&id)?, &req.name, &req.description)
        .await?;
    Ok(Json(category))
}

/// `DELETE /categories/{id}`: Delete an unreferenced category.
///
/// # Errors
///
/// Returns [`CatalogError`] for non-admin callers, an unknown id, or a
/// category still referenced by products.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    summary = "Delete category",
    description = "Requires the admin role. Refused with 409 while any product references the category.",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category deleted", body = DeletedCategoryResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still referenced", body = ErrorResponse),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let deleted = state
        .catalog
        .delete_category(&user.actor, category_id(&id)?)
        .await?;
    Ok(Json(DeletedCategoryResponse {
        message: format!("category '{}' deleted", deleted.name),
        deleted_category: deleted,
    }))
}

/// `POST /categories/seed`: Create the missing sample categories.
///
/// # Errors
///
/// Returns [`CatalogError::Forbidden`] for non-admin callers.
#[utoipa::path(
    post,
    path = "/api/categories/seed",
    tag = "Categories",
    summary = "Seed sample categories",
    description = "Requires the admin role. Creates only the samples that do not exist yet; each is logged as a normal create.",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Missing samples created", body = SeedResponse),
        (status = 200, description = "Every sample already existed", body = SeedResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
    )
)]
pub async fn seed_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, CatalogError> {
    let categories = state.catalog.seed_samples(&user.actor).await?;
    let status = if categories.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(SeedResponse {
            message: format!("{} sample categories created", categories.len()),
            categories,
        }),
    ))
}

/// Category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/seed", post(seed_categories))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}
