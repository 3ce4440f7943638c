//! User account models
//!
//! This module defines the persisted user record, the request principal
//! derived from it, and the register/login payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database ID
    pub id: i64,

    /// Display name
    pub user_name: String,

    /// Unique e-mail address
    pub email: String,

    /// Argon2id hash (PHC string), never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: i64,
    pub email: String,
    #[serde(rename = "userName")]
    pub display_name: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.user_name.clone(),
        }
    }
}

/// Body of `POST /register`
///
/// Every field is optional on the wire so that missing fields are reported
/// as validation messages rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /login`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token to send as `Authorization: Bearer <token>`
    pub token: String,
    pub id: i64,
    pub email: String,
    pub user_name: String,
}
