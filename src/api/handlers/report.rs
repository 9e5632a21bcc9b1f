//! Report handlers: statistics and activity history.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::HistoryParams;
use crate::api::extract::{ApiQuery, CurrentUser};
use crate::app_state::AppState;
use crate::domain::{ActivityLogEntry, CatalogStatistics};
use crate::error::{CatalogError, ErrorResponse};

/// `GET /reports/statistics`: Catalog aggregates.
///
/// # Errors
///
/// Returns [`CatalogError`] on authentication or storage failure.
#[utoipa::path(
    get,
    path = "/api/reports/statistics",
    tag = "Reports",
    summary = "Catalog statistics",
    description = "Recomputed from current catalog contents on every call.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregates", body = CatalogStatistics),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, CatalogError> {
    let stats = state.reports.statistics(&user.actor).await?;
    Ok(Json(stats))
}

/// `GET /reports/history`: Activity log entries, newest first.
///
/// # Errors
///
/// Returns [`CatalogError::Invalid`] for a malformed time range or action.
#[utoipa::path(
    get,
    path = "/api/reports/history",
    tag = "Reports",
    summary = "Activity history",
    security(("bearer_auth" = [])),
    params(HistoryParams),
    responses(
        (status = 200, description = "Entries inside the window", body = Vec<ActivityLogEntry>),
        (status = 400, description = "Malformed query", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn history(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<impl IntoResponse, CatalogError> {
    let query = params.into_query()?;
    let entries = state.reports.history(&user.actor, &query).await?;
    Ok(Json(entries))
}

/// Report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/statistics", get(statistics))
        .route("/reports/history", get(history))
}
