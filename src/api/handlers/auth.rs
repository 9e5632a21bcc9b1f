//! Session handlers: login, logout, current user.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, LoginResponse, MessageResponse};
use crate::api::extract::{ApiJson, CurrentUser};
use crate::app_state::AppState;
use crate::domain::Actor;
use crate::error::{CatalogError, ErrorResponse};

/// `POST /auth/login`: Exchange credentials for a bearer token.
///
/// # Errors
///
/// Returns [`CatalogError::Unauthenticated`] for invalid credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let session = state.identity.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
        expires_at: session.expires_at,
    }))
}

/// `POST /auth/logout`: Revoke the caller's token.
///
/// # Errors
///
/// Returns [`CatalogError::Unauthenticated`] without a valid token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    summary = "Log out",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session closed", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, CatalogError> {
    state.identity.logout(&user.token).await?;
    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// `GET /auth/me`: The user behind the caller's token.
///
/// # Errors
///
/// Returns [`CatalogError::Unauthenticated`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    summary = "Current user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resolved user", body = Actor),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(user: CurrentUser) -> Json<Actor> {
    Json(user.actor)
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
