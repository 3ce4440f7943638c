//! Authentication manager
//!
//! This module provides the main authentication interface for the application.
//! It handles account registration, login and request token resolution.

use std::sync::Arc;
use std::time::Duration;

use crate::database::Database;
use crate::error::{AppError, AuthError, LoginError};
use crate::models::{LoginRequest, LoginResponse, NewUser, Principal, RegisterRequest, User};

use super::password::{hash_password, verify_password};
use super::resolver::PrincipalResolver;
use super::token::{Claims, TokenService};

/// Authentication manager
///
/// Owns the token service and the principal resolver; shared by the router
/// and the authentication middleware.
pub struct AuthManager<D: Database> {
    db: Arc<D>,
    tokens: Arc<TokenService>,
    resolver: PrincipalResolver<D>,
}

impl<D: Database> AuthManager<D> {
    /// Create a new authentication manager
    pub fn new(db: Arc<D>, tokens: Arc<TokenService>, lookup_timeout: Duration) -> Self {
        let resolver = PrincipalResolver::new(Arc::clone(&db), Arc::clone(&tokens), lookup_timeout);
        Self {
            db,
            tokens,
            resolver,
        }
    }

    /// The token service used to sign and verify tokens
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve a bearer token to the principal it names
    pub async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        self.resolver.resolve(token).await
    }

    /// Issue a token for a stored user
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        self.tokens
            .issue(&Claims::new(user.id, user.email.clone(), user.user_name.clone()))
    }

    /// Register a new account
    ///
    /// Every missing field is reported; a taken e-mail is a constraint
    /// violation.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let mut errors = Vec::new();

        let user_name = non_blank(request.user_name.as_deref());
        let email = non_blank(request.email.as_deref());
        let password = request.password.as_deref().filter(|p| !p.is_empty());

        if user_name.is_none() {
            errors.push("userName is required".to_string());
        }
        match email {
            None => errors.push("email is required".to_string()),
            Some(e) if !e.contains('@') => {
                errors.push("email must be a valid email address".to_string())
            }
            Some(_) => {}
        }
        if password.is_none() {
            errors.push("password is required".to_string());
        }

        let (Some(user_name), Some(email), Some(password), true) =
            (user_name, email, password, errors.is_empty())
        else {
            return Err(AppError::Validation(errors));
        };

        let password_hash =
            hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;

        let user = self
            .db
            .create_user(&NewUser::new(user_name, email, password_hash))
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = non_blank(request.email.as_deref()).ok_or(LoginError::MissingEmail)?;
        let password = request
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(LoginError::MissingPassword)?;

        let user = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or(LoginError::UnknownEmail)?;

        if !verify_password(password, &user.password_hash) {
            return Err(LoginError::WrongPassword.into());
        }

        let token = self.issue_token(&user)?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginResponse {
            token,
            id: user.id,
            email: user.email,
            user_name: user.user_name,
        })
    }

    /// Remove the principal's account and everything it owns
    ///
    /// Tokens already issued for the account resolve to `UnknownPrincipal`
    /// afterwards.
    pub async fn delete_account(&self, principal: &Principal) -> Result<(), AppError> {
        if !self.db.delete_user(principal.id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = principal.id, "Account deleted");
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
