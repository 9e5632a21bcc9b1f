//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod category;
pub mod product;
pub mod report;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(category::routes())
        .merge(product::routes())
        .merge(report::routes())
}
