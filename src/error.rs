//! Request-boundary error type with HTTP status code mapping.
//!
//! [`CatalogError`] is the single error type returned by services and
//! handlers. Each variant is one kind of the error taxonomy and maps to a
//! fixed HTTP status, a numeric code, and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::domain::{AccessDenied, ValidationError};
use crate::store::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "kind": "conflict",
///     "message": "category name already exists: Drinks"
///   },
///   "message": "category name already exists: Drinks"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
    /// Copy of `error.message` for clients that only read a top-level message.
    pub message: String,
}

/// Inner error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Taxonomy kind (`invalid`, `conflict`, `not_found`, ...).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

/// Request-boundary error taxonomy.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status        |
/// |-----------|-----------------|--------------------|
/// | 1000–1999 | Validation      | 400                |
/// | 2000–2999 | State           | 404 / 409          |
/// | 3000–3999 | Identity        | 401 / 403          |
/// | 5000–5999 | Server          | 408 / 500          |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Malformed or out-of-bounds input.
    #[error("{0}")]
    Invalid(String),

    /// Unknown id.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or referential conflict.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Role insufficient for the action.
    #[error("{0}")]
    Forbidden(String),

    /// The request deadline elapsed.
    #[error("{0}")]
    Timeout(String),

    /// Persistence or other server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl CatalogError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Invalid(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Conflict(_) => 2002,
            Self::Unauthenticated(_) => 3001,
            Self::Forbidden(_) => 3002,
            Self::Internal(_) => 5000,
            Self::Timeout(_) => 5001,
        }
    }

    /// Returns the taxonomy kind as it appears on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the JSON body for this error.
    #[must_use]
    pub fn to_response_body(&self) -> ErrorResponse {
        let message = self.to_string();
        ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind().to_string(),
                message: message.clone(),
            },
            message,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let mut response = axum::Json(self.to_response_body()).into_response();
        *response.status_mut() = self.status_code();
        response
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl From<AccessDenied> for CatalogError {
    fn from(err: AccessDenied) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCategoryName(_) | StoreError::DuplicateSku(_) => {
                Self::Conflict(err.to_string())
            }
            StoreError::CategoryInUse { id, products } if products > 0 => Self::Conflict(format!(
                "category {id} is still referenced by {products} product(s)"
            )),
            StoreError::CategoryInUse { .. } => Self::Conflict(err.to_string()),
            StoreError::CategoryNotFound(_) | StoreError::ProductNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            StoreError::UnknownCategory(_) => Self::Invalid(err.to_string()),
            StoreError::Backend(_) => Self::Internal("internal storage error".to_string()),
        }
    }
}

impl From<AuthError> for CatalogError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                Self::Unauthenticated(err.to_string())
            }
            AuthError::Internal(_) => Self::Internal("authentication backend error".to_string()),
        }
    }
}
