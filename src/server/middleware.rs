//! HTTP middleware for fittrack
//!
//! This module provides middleware layers for:
//! - Authentication (bearer token)
//! - Request/response logging

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::error::{AppError, AuthError};
use crate::models::Principal;

const BEARER_PREFIX: &str = "Bearer ";

/// Principal attached to an authenticated request
#[derive(Clone, Debug)]
pub struct AuthenticatedPrincipal(pub Principal);

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// The scheme must match exactly and be followed by one space and a non-empty
/// token containing no whitespace.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingOrMalformedHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingOrMalformedHeader)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingOrMalformedHeader)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthError::MissingOrMalformedHeader);
    }

    Ok(token)
}

/// Authentication middleware function
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Resolves it to a principal
/// 3. Adds the principal to the request extensions
///
/// On failure the request is answered with the classified error and no
/// downstream handler runs.
pub async fn auth_middleware<D: Database + 'static>(
    State(auth_manager): State<Arc<AuthManager<D>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers()).map(str::to_owned);

    let resolved = match token {
        Ok(token) => auth_manager.resolve(&token).await,
        Err(e) => Err(e),
    };

    match resolved {
        Ok(principal) => {
            tracing::debug!(principal_id = principal.id, "Request authenticated");
            request
                .extensions_mut()
                .insert(AuthenticatedPrincipal(principal));
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(
                kind = e.kind(),
                path = %request.uri().path(),
                "Request authentication rejected"
            );
            Err(e.into())
        }
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}
