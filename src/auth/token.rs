//! Bearer token issuing and verification
//!
//! Tokens are HS256 JWTs signed with the process signing secret. The secret is
//! handed to [`TokenService::new`] once at startup and never changes.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{AppError, AuthError};

/// Identity attributes carried by a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: i64,
    pub email: String,
    /// Display name
    pub name: String,
}

impl Claims {
    pub fn new(id: i64, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Payload as it appears on the wire
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    id: i64,
    email: String,
    name: String,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl From<WireClaims> for Claims {
    fn from(wire: WireClaims) -> Self {
        Self {
            id: wire.id,
            email: wire.email,
            name: wire.name,
        }
    }
}

/// Issues and verifies bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Option<Duration>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service
    ///
    /// With `lifetime` set, tokens carry an `exp` claim and are rejected once it
    /// has passed (no leeway). Without it tokens never expire.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty secret.
    pub fn new(secret: &str, lifetime: Option<Duration>) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if lifetime.is_some() {
            validation.set_required_spec_claims(&["exp"]);
            validation.validate_exp = true;
        } else {
            validation.required_spec_claims.clear();
            validation.validate_exp = false;
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    /// Token lifetime, if tokens expire
    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    /// Sign `claims` into a compact token string
    ///
    /// A signing failure is a server fault, reported as `AppError::Internal`.
    pub fn issue(&self, claims: &Claims) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let exp = self.lifetime.map(|lifetime| {
            iat.saturating_add(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
        });

        let wire = WireClaims {
            id: claims.id,
            email: claims.email.clone(),
            name: claims.name.clone(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &wire, &self.encoding_key).map_err(signing_failed)
    }

    /// Verify a token and return its claims
    ///
    /// Any signature, structure or expiry failure is `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Token verification failed");
                AuthError::InvalidToken
            })
    }
}

fn signing_failed(e: jsonwebtoken::errors::Error) -> AppError {
    AppError::Internal(format!("failed to sign token: {}", e))
}
