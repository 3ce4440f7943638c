//! Application error types for fittrack
//!
//! Every component returns one of the enums below. `classify` is the single
//! place where an error is turned into an HTTP status and a JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failures produced by the token service, the principal
/// resolver and the request gate
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization header absent or not of the form `Bearer <token>`
    #[error("Missing or malformed authorization header")]
    MissingOrMalformedHeader,

    /// Signature, structure or expiry check failed
    #[error("Invalid token")]
    InvalidToken,

    /// Token verified but the user it names no longer exists
    #[error("Unknown principal")]
    UnknownPrincipal,

    /// The user store could not be reached or timed out
    #[error("Principal lookup failed")]
    LookupFailed,
}

impl AuthError {
    /// Stable identifier used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingOrMalformedHeader => "missing_or_malformed_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::UnknownPrincipal => "unknown_principal",
            AuthError::LookupFailed => "lookup_failed",
        }
    }
}

/// Login failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Email is not registered")]
    UnknownEmail,

    #[error("Invalid email or password")]
    WrongPassword,
}

impl LoginError {
    pub fn kind(&self) -> &'static str {
        match self {
            LoginError::MissingEmail => "login_missing_email",
            LoginError::MissingPassword => "login_missing_password",
            LoginError::UnknownEmail => "login_unknown_email",
            LoginError::WrongPassword => "login_wrong_password",
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Background connection error
    #[error("Database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    /// Record not found
    #[error("Record not found")]
    NotFound,

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Errors from the outbound exercise and recommendation services
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpstreamError {
    /// The collaborator is not configured
    #[error("Upstream service not configured: {0}")]
    NotConfigured(String),

    /// Network timeout
    #[error("Upstream timeout")]
    Timeout,

    /// Non-success status from upstream
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// Body could not be interpreted
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Generic network error
    #[error("Network error: {0}")]
    Network(String),
}

/// Application-level error type
///
/// Handlers and middleware return this type; its `IntoResponse` impl routes
/// every failure through [`classify`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single validation message
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    /// Stable identifier used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.kind(),
            AppError::Login(e) => e.kind(),
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Database(DbError::NotFound) => "db_not_found",
            AppError::Database(DbError::ConstraintViolation(_)) => "db_constraint",
            AppError::Database(_) => "db_error",
            AppError::Upstream(UpstreamError::NotConfigured(_)) => "upstream_not_configured",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal",
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Map an error to its wire status and body
///
/// Pure and total. Internal details (SQL errors, upstream bodies) never reach
/// the body.
pub fn classify(err: &AppError) -> (StatusCode, ErrorBody) {
    match err {
        AppError::Auth(auth) => match auth {
            AuthError::MissingOrMalformedHeader | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new(auth.to_string()))
            }
            AuthError::UnknownPrincipal => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new("Invalid token"))
            }
            AuthError::LookupFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(INTERNAL_MESSAGE),
            ),
        },
        AppError::Login(login) => (StatusCode::UNAUTHORIZED, ErrorBody::new(login.to_string())),
        AppError::Validation(messages) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new(messages.join(", ")))
        }
        AppError::NotFound(what) => (StatusCode::NOT_FOUND, ErrorBody::new(what.clone())),
        AppError::Database(db) => match db {
            DbError::NotFound => (StatusCode::NOT_FOUND, ErrorBody::new("Record not found")),
            DbError::ConstraintViolation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone()))
            }
            DbError::Sqlite(_) | DbError::Connection(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(INTERNAL_MESSAGE),
            ),
        },
        AppError::Upstream(upstream) => match upstream {
            UpstreamError::NotConfigured(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::new("Service not available"),
            ),
            UpstreamError::Timeout
            | UpstreamError::Status(_)
            | UpstreamError::InvalidResponse(_)
            | UpstreamError::Network(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("Upstream service unavailable"),
            ),
        },
        AppError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(INTERNAL_MESSAGE),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = classify(&self);

        if status.is_server_error() {
            tracing::error!(
                kind = self.kind(),
                status = status.as_u16(),
                error = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                kind = self.kind(),
                status = status.as_u16(),
                "Request rejected"
            );
        }

        (status, Json(body)).into_response()
    }
}
