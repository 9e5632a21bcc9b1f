//! Request deadline middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::app_state::AppState;
use crate::error::CatalogError;

/// Bounds the handling of each request by `AppState::request_timeout`.
///
/// When the deadline elapses the in-flight handler future is dropped and a
/// `408` with a `timeout` error body is returned. Store mutations are
/// transactional, so a dropped handler never leaves a write without its
/// activity log entry.
pub async fn request_deadline(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, path, timeout = ?state.request_timeout, "request deadline exceeded");
            CatalogError::Timeout(format!(
                "request did not complete within {} seconds",
                state.request_timeout.as_secs_f64()
            ))
            .into_response()
        }
    }
}
