//! Product handlers: filtered list, get, create, update, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DeletedProductResponse, ProductQuery, ProductRequest};
use crate::api::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::app_state::AppState;
use crate::domain::{Product, ProductId};
use crate::error::{CatalogError, ErrorResponse};

fn product_id(raw: &str) -> Result<ProductId, CatalogError> {
    raw.parse()
        .map_err(|_| CatalogError::Invalid(format!("invalid product id: '{raw}'")))
}

/// `GET /products`: List products, optionally filtered.
///
/// # Errors
///
/// Returns [`CatalogError::Invalid`] for malformed query parameters.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    summary = "List products",
    description = "All given criteria must match. `keyword` is a case-insensitive substring of name or description; the price range is inclusive.",
    security(("bearer_auth" = [])),
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let filter = query.into_filter()?;
    let products = state.catalog.list_products(&user.actor, &filter).await?;
    Ok(Json(products))
}

/// `GET /products/{id}`: Get one product.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the product does not exist.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    summary = "Get product",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let product = state.catalog.get_product(&user.actor, product_id(&id)?).await?;
    Ok(Json(product))
}

/// `POST /products`: Create a product.
///
/// # Errors
///
/// Returns [`CatalogError`] for staff callers, invalid fields, an unknown
/// category, or a duplicate SKU.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    summary = "Create product",
    description = "Requires the manager or admin role. `categoryId` must reference an existing category.",
    security(("bearer_auth" = [])),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid fields or unknown category", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 409, description = "Duplicate SKU", body = ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<ProductRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let product = state
        .catalog
        .create_product(&user.actor, req.as_input())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}`: Replace a product.
///
/// # Errors
///
/// Returns [`CatalogError`] for staff callers, invalid fields, an unknown
/// id or category, or a duplicate SKU.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    summary = "Update product",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid fields or unknown category", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Duplicate SKU", body = ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ProductRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let product = state
        .catalog
        .update_product(&user.actor, product_id(&id)?, req.as_input())
        .await?;
    Ok(Json(product))
}

/// `DELETE /products/{id}`: Delete a product.
///
/// # Errors
///
/// Returns [`CatalogError`] for non-admin callers or an unknown id.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    summary = "Delete product",
    description = "Requires the admin role.",
    security(("bearer_auth" = [])),
    params(("id" = uuid::Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deleted", body = DeletedProductResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let deleted = state
        .catalog
        .delete_product(&user.actor, product_id(&id)?)
        .await?;
    Ok(Json(DeletedProductResponse {
        message: format!("product '{}' deleted", deleted.name),
        deleted_product: deleted,
    }))
}

/// Product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}
