//! Client-side error taxonomy.

use std::fmt;

use reqwest::StatusCode;

/// What went wrong, as seen by a caller of the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected input (400 and other unexpected 4xx).
    Invalid,
    /// Missing or invalid credential (401).
    Unauthenticated,
    /// Role insufficient (403).
    Forbidden,
    /// Unknown id (404).
    NotFound,
    /// Uniqueness or referential conflict (409).
    Conflict,
    /// Deadline exceeded, on either side (408 or client timer).
    Timeout,
    /// Server-side failure (5xx) or an unreadable response.
    Internal,
    /// The server could not be reached at all.
    Unavailable,
}

impl ErrorKind {
    /// Maps a non-success HTTP status to a kind.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::Invalid,
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::Conflict,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::Timeout,
            s if s.is_server_error() => Self::Internal,
            _ => Self::Invalid,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Error returned by [`super::CatalogClient`].
///
/// `message` is the server's message verbatim when one was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    /// Error kind.
    pub kind: ErrorKind,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error came from a deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Unavailable
        } else if err.is_decode() {
            ErrorKind::Internal
        } else if err.is_builder() {
            ErrorKind::Invalid
        } else {
            ErrorKind::Unavailable
        };
        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
