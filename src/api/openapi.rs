//! OpenAPI document generated from handler annotations via utoipa.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers::{auth, category, product, report, system};

/// Top-level OpenAPI document for the catalog service.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        description = "Inventory catalog with role-gated mutations, an append-only activity log, and reports."
    ),
    modifiers(&SecurityAddon),
    paths(
        system::banner_handler,
        system::health_handler,
        auth::login,
        auth::logout,
        auth::me,
        category::list_categories,
        category::get_category,
        category::create_category,
        category::update_category,
        category::delete_category,
        category::seed_categories,
        product::list_products,
        product::get_product,
        product::create_product,
        product::update_product,
        product::delete_product,
        report::statistics,
        report::history,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    tags(
        (name = "Auth", description = "Bearer sessions"),
        (name = "Categories", description = "Category CRUD"),
        (name = "Products", description = "Product CRUD and filtering"),
        (name = "Reports", description = "Statistics and activity history"),
        (name = "System", description = "Banner and health"),
    )
)]
pub struct ApiDoc;

/// Adds the bearer token security scheme.
#[derive(Debug)]
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
