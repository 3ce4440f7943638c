//! Principal resolution
//!
//! Turns a raw bearer token into the [`Principal`] it names: verify the token,
//! then confirm the user still exists.

use std::sync::Arc;
use std::time::Duration;

use crate::database::Database;
use crate::error::AuthError;
use crate::models::Principal;

use super::token::TokenService;

/// Resolves bearer tokens to principals
pub struct PrincipalResolver<D: Database> {
    db: Arc<D>,
    tokens: Arc<TokenService>,
    lookup_timeout: Duration,
}

impl<D: Database> PrincipalResolver<D> {
    pub fn new(db: Arc<D>, tokens: Arc<TokenService>, lookup_timeout: Duration) -> Self {
        Self {
            db,
            tokens,
            lookup_timeout,
        }
    }

    /// Resolve a token
    ///
    /// - verification failure: `InvalidToken`
    /// - store error or timeout: `LookupFailed`
    /// - no such user: `UnknownPrincipal`
    pub async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify(token)?;

        let lookup = tokio::time::timeout(self.lookup_timeout, self.db.find_user_by_id(claims.id));

        match lookup.await {
            Ok(Ok(Some(user))) => Ok(Principal::from(&user)),
            Ok(Ok(None)) => Err(AuthError::UnknownPrincipal),
            Ok(Err(e)) => {
                tracing::error!(user_id = claims.id, error = %e, "Principal lookup failed");
                Err(AuthError::LookupFailed)
            }
            Err(_) => {
                tracing::error!(
                    user_id = claims.id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Principal lookup timed out"
                );
                Err(AuthError::LookupFailed)
            }
        }
    }
}
