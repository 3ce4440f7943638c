//! Database layer for fittrack
//!
//! This module defines the database trait and SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewUser, ProgressLog, ProgressLogFields, User, UserPreference};

/// Database trait for data persistence
///
/// The user operations double as the user-lookup collaborator of the
/// principal resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Create a user
    ///
    /// Fails with `DbError::ConstraintViolation` when the e-mail is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, DbError>;

    /// Find a user by ID
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    /// Find a user by e-mail
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Delete a user and everything it owns
    ///
    /// Returns false when no such user existed
    async fn delete_user(&self, id: i64) -> Result<bool, DbError>;

    // =========================================================================
    // Progress log operations
    // =========================================================================

    /// Create a progress log owned by `user_id`
    async fn create_progress_log(
        &self,
        user_id: i64,
        fields: &ProgressLogFields,
    ) -> Result<ProgressLog, DbError>;

    /// Get a progress log by ID
    async fn get_progress_log(&self, id: i64) -> Result<Option<ProgressLog>, DbError>;

    /// List the progress logs of a user, newest first
    async fn list_progress_logs(&self, user_id: i64) -> Result<Vec<ProgressLog>, DbError>;

    /// Replace the fields of a progress log
    ///
    /// Returns None when no such log exists
    async fn update_progress_log(
        &self,
        id: i64,
        fields: &ProgressLogFields,
    ) -> Result<Option<ProgressLog>, DbError>;

    /// Delete a progress log
    ///
    /// Returns false when no such log existed
    async fn delete_progress_log(&self, id: i64) -> Result<bool, DbError>;

    // =========================================================================
    // Preference operations
    // =========================================================================

    /// Get the preferences of a user
    async fn get_preference(&self, user_id: i64) -> Result<Option<UserPreference>, DbError>;

    /// Insert or replace the preferences of a user
    async fn upsert_preference(
        &self,
        user_id: i64,
        preferred_sports: &str,
        fitness_goal: &str,
    ) -> Result<UserPreference, DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            user_name: "tester".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_database_user_lookup() {
        let mut mock = MockDatabase::new();

        mock.expect_find_user_by_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(user(1, "a@example.com"))));
        mock.expect_find_user_by_email()
            .returning(|_| Ok(None));

        let found = mock.find_user_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.email, "a@example.com");

        assert!(mock
            .find_user_by_email("missing@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_mock_database_error_handling() {
        let mut mock = MockDatabase::new();

        mock.expect_create_user().returning(|_| {
            Err(DbError::ConstraintViolation(
                "Email already registered".to_string(),
            ))
        });

        let result = mock
            .create_user(&NewUser::new("x", "dup@example.com", "hash"))
            .await;
        match result {
            Err(DbError::ConstraintViolation(msg)) => assert!(msg.contains("Email")),
            _ => panic!("Expected DbError::ConstraintViolation"),
        }
    }
}
