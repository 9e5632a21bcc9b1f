//! REST API layer: route handlers, DTOs, extractors, and router composition.
//!
//! Resource endpoints are mounted under `/api`; `/` and `/health` live at
//! the root. With the `swagger-ui` feature, Swagger UI is served at
//! `/swagger-ui` and the document at `/api-docs/openapi.json`.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

/// Builds the router with state, the request deadline, tracing, and CORS.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_deadline,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
