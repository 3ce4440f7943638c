//! SQLite implementation of the Database trait
//!
//! This module provides a SQLite-based implementation of the Database trait
//! using rusqlite and tokio-rusqlite for async operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{ErrorCode, OptionalExtension};
use tokio_rusqlite::Connection;

use super::migrations::CREATE_SCHEMA;
use super::Database;
use crate::error::DbError;
use crate::models::{NewUser, ProgressLog, ProgressLogFields, User, UserPreference};

const USER_COLUMNS: &str = "id, user_name, email, password_hash, created_at";

const PROGRESS_LOG_COLUMNS: &str = "id, user_id, sport, duration, calories_burned, tags, \
     price_per_session, description, created_at, updated_at";

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for in-memory database or a file path for persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        // Run migrations
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: &NewUser) -> Result<User, DbError> {
        let user_name = user.user_name.clone();
        let email = user.email.clone();
        let password_hash = user.password_hash.clone();
        let created_at = Utc::now();
        let created_at_str = created_at.to_rfc3339();

        let inserted = self
            .conn
            .call(move |conn| {
                let result = conn.execute(
                    r#"
                    INSERT INTO users (user_name, email, password_hash, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    rusqlite::params![user_name, email, password_hash, created_at_str],
                );

                match result {
                    Ok(_) => Ok(Some(User {
                        id: conn.last_insert_rowid(),
                        user_name,
                        email,
                        password_hash,
                        created_at,
                    })),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == ErrorCode::ConstraintViolation =>
                    {
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        inserted.ok_or_else(|| DbError::ConstraintViolation("Email already registered".to_string()))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;
                let user = stmt.query_row([id], user_from_row).optional()?;
                Ok(user)
            })
            .await
            .map_err(Into::into)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM users WHERE email = ?1",
                    USER_COLUMNS
                ))?;
                let user = stmt.query_row([&email], user_from_row).optional()?;
                Ok(user)
            })
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        self.conn
            .call(move |conn| {
                let count = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
                Ok(count > 0)
            })
            .await
            .map_err(Into::into)
    }

    // =========================================================================
    // Progress log operations
    // =========================================================================

    async fn create_progress_log(
        &self,
        user_id: i64,
        fields: &ProgressLogFields,
    ) -> Result<ProgressLog, DbError> {
        let fields = fields.clone();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO progress_logs
                    (user_id, sport, duration, calories_burned, tags, price_per_session,
                     description, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                    "#,
                    rusqlite::params![
                        user_id,
                        fields.sport,
                        fields.duration,
                        fields.calories_burned,
                        fields.tags,
                        fields.price_per_session,
                        fields.description,
                        now_str
                    ],
                )?;

                Ok(ProgressLog {
                    id: conn.last_insert_rowid(),
                    user_id,
                    sport: fields.sport,
                    duration: fields.duration,
                    calories_burned: fields.calories_burned,
                    tags: fields.tags,
                    price_per_session: fields.price_per_session,
                    description: fields.description,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
            .map_err(Into::into)
    }

    async fn get_progress_log(&self, id: i64) -> Result<Option<ProgressLog>, DbError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM progress_logs WHERE id = ?1",
                    PROGRESS_LOG_COLUMNS
                ))?;
                let log = stmt.query_row([id], progress_log_from_row).optional()?;
                Ok(log)
            })
            .await
            .map_err(Into::into)
    }

    async fn list_progress_logs(&self, user_id: i64) -> Result<Vec<ProgressLog>, DbError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM progress_logs WHERE user_id = ?1 ORDER BY id DESC",
                    PROGRESS_LOG_COLUMNS
                ))?;

                let logs = stmt
                    .query_map([user_id], progress_log_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(logs)
            })
            .await
            .map_err(Into::into)
    }

    async fn update_progress_log(
        &self,
        id: i64,
        fields: &ProgressLogFields,
    ) -> Result<Option<ProgressLog>, DbError> {
        let fields = fields.clone();
        let now_str = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                let count = conn.execute(
                    r#"
                    UPDATE progress_logs
                    SET sport = ?1, duration = ?2, calories_burned = ?3, tags = ?4,
                        price_per_session = ?5, description = ?6, updated_at = ?7
                    WHERE id = ?8
                    "#,
                    rusqlite::params![
                        fields.sport,
                        fields.duration,
                        fields.calories_burned,
                        fields.tags,
                        fields.price_per_session,
                        fields.description,
                        now_str,
                        id
                    ],
                )?;

                if count == 0 {
                    return Ok(None);
                }

                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM progress_logs WHERE id = ?1",
                    PROGRESS_LOG_COLUMNS
                ))?;
                let log = stmt.query_row([id], progress_log_from_row).optional()?;
                Ok(log)
            })
            .await
            .map_err(Into::into)
    }

    async fn delete_progress_log(&self, id: i64) -> Result<bool, DbError> {
        self.conn
            .call(move |conn| {
                let count = conn.execute("DELETE FROM progress_logs WHERE id = ?1", [id])?;
                Ok(count > 0)
            })
            .await
            .map_err(Into::into)
    }

    // =========================================================================
    // Preference operations
    // =========================================================================

    async fn get_preference(&self, user_id: i64) -> Result<Option<UserPreference>, DbError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT user_id, preferred_sports, fitness_goal, updated_at
                    FROM user_preferences
                    WHERE user_id = ?1
                    "#,
                )?;
                let pref = stmt.query_row([user_id], preference_from_row).optional()?;
                Ok(pref)
            })
            .await
            .map_err(Into::into)
    }

    async fn upsert_preference(
        &self,
        user_id: i64,
        preferred_sports: &str,
        fitness_goal: &str,
    ) -> Result<UserPreference, DbError> {
        let preferred_sports = preferred_sports.to_string();
        let fitness_goal = fitness_goal.to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO user_preferences (user_id, preferred_sports, fitness_goal, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(user_id) DO UPDATE SET
                        preferred_sports = excluded.preferred_sports,
                        fitness_goal = excluded.fitness_goal,
                        updated_at = excluded.updated_at
                    "#,
                    rusqlite::params![user_id, preferred_sports, fitness_goal, now_str],
                )?;

                Ok(UserPreference {
                    user_id,
                    preferred_sports,
                    fitness_goal,
                    updated_at: now,
                })
            })
            .await
            .map_err(Into::into)
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        user_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(row.get::<_, Option<String>>(4)?).unwrap_or_else(Utc::now),
    })
}

fn progress_log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressLog> {
    let created_at = parse_datetime(row.get::<_, Option<String>>(8)?).unwrap_or_else(Utc::now);
    Ok(ProgressLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        sport: row.get(2)?,
        duration: row.get(3)?,
        calories_burned: row.get(4)?,
        tags: row.get(5)?,
        price_per_session: row.get(6)?,
        description: row.get(7)?,
        created_at,
        updated_at: parse_datetime(row.get::<_, Option<String>>(9)?).unwrap_or(created_at),
    })
}

fn preference_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserPreference> {
    Ok(UserPreference {
        user_id: row.get(0)?,
        preferred_sports: row.get(1)?,
        fitness_goal: row.get(2)?,
        updated_at: parse_datetime(row.get::<_, Option<String>>(3)?).unwrap_or_else(Utc::now),
    })
}

/// Parse a datetime string to DateTime<Utc>
fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // Try parsing SQLite's datetime format
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    })
}
