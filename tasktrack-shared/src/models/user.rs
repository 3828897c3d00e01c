/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     password TEXT NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # First user is admin
///
/// [`User::register`] promotes the very first account to administrator. The
/// uniqueness check, the user count, and the insert run in one transaction
/// that holds a self-conflicting lock on `users`, so concurrent registrations
/// queue up behind each other and at most one of them can observe an empty
/// table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    /// Unique login name
    pub username: String,

    /// Unique email address, used for login
    pub email: String,

    /// Argon2id password hash (column `password`)
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the user may manage settings
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, as returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Input for registering a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Argon2id hash, NOT the plaintext password
    pub password_hash: String,
}

/// Error type for registration
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// Username or email already taken
    #[error("User already exists")]
    UserExists,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const USER_COLUMNS: &str = "id, username, email, password, is_admin, created_at";

impl User {
    /// Registers a user, making them admin if no other user exists yet
    ///
    /// # Errors
    ///
    /// - [`RegisterError::UserExists`] if the username or email is taken,
    ///   including when a concurrent registration wins the unique constraint
    /// - [`RegisterError::Database`] on any other store failure
    pub async fn register(pool: &PgPool, data: NewUser) -> Result<Self, RegisterError> {
        let mut tx = pool.begin().await?;

        // SHARE ROW EXCLUSIVE conflicts with itself but not with plain reads
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(&data.email)
        .bind(&data.username)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(RegisterError::UserExists);
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let is_first_user = count == 0;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password, is_admin) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(is_first_user)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RegisterError::UserExists
            }
            other => RegisterError::Database(other),
        })?;

        tx.commit().await?;

        if user.is_admin {
            tracing::info!(user_id = user.id, "First user registered, granted admin");
        }

        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a user; their tasks go with them (`ON DELETE CASCADE`)
    ///
    /// Returns false if the user did not exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
