//! HTTP error types.
//!
//! Maps domain errors from `rsvp-core` into plain-text HTTP responses. The
//! body is the user-facing message; underlying storage errors are logged
//! and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use rsvp_core::error::{AdminError, ReadError, RsvpError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No storage backend is configured.
    #[error("Database not configured")]
    NotConfigured,

    /// Missing session or wrong password.
    #[error("{0}")]
    Unauthorized(String),

    /// The operation is not allowed right now.
    #[error("{0}")]
    Forbidden(String),

    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Client sent invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// The write would duplicate an existing record.
    #[error("{0}")]
    Conflict(String),

    /// A server-side failure; the message names the failed operation.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotConfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Log a storage failure and turn it into an [`AppError::Internal`] carrying
/// only the user-facing message.
fn internal(err: &(dyn std::error::Error + 'static)) -> AppError {
    let cause = err
        .source()
        .map_or_else(|| err.to_string(), ToString::to_string);
    tracing::error!(error = %cause, "{err}");
    AppError::Internal(err.to_string())
}

impl From<RsvpError> for AppError {
    fn from(err: RsvpError) -> Self {
        match err {
            RsvpError::Validation(e) => Self::BadRequest(e.to_string()),
            RsvpError::EventNotFound => Self::NotFound(err.to_string()),
            RsvpError::LoginRequired => Self::Unauthorized(err.to_string()),
            RsvpError::Closed => Self::Forbidden(err.to_string()),
            RsvpError::AlreadyResponded => Self::Conflict(err.to_string()),
            RsvpError::Save(_) => internal(&err),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(e) => Self::BadRequest(e.to_string()),
            AdminError::EventNotFound => Self::NotFound(err.to_string()),
            AdminError::UpdateEvent(_) | AdminError::PostUpdate(_) => internal(&err),
        }
    }
}

impl From<ReadError> for AppError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::EventNotFound => Self::NotFound(err.to_string()),
            ReadError::Storage(_) => internal(&err),
        }
    }
}
