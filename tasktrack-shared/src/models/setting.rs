/// Setting model and database operations
///
/// Settings are process-wide key/value pairs managed by administrators. Two
/// keys carry behavior:
///
/// - `jwt_secret`: the live token signing secret (see [`crate::auth::secret`])
/// - `allow_registration`: registration is refused when the value is exactly `"false"`
///
/// # Schema
///
/// ```sql
/// CREATE TABLE settings (
///     key TEXT PRIMARY KEY,
///     value TEXT NOT NULL,
///     description TEXT,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::secret::JWT_SECRET_KEY;

/// Settings key controlling whether new users may register
pub const ALLOW_REGISTRATION_KEY: &str = "allow_registration";

/// Settings key holding the application display name
pub const APP_NAME_KEY: &str = "app_name";

/// Keys visible to non-admin users
pub const PUBLIC_KEYS: [&str; 2] = [APP_NAME_KEY, ALLOW_REGISTRATION_KEY];

/// Setting row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a setting
#[derive(Debug, Clone)]
pub struct NewSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Returns whether non-admin users may read `key`
pub fn is_public_key(key: &str) -> bool {
    PUBLIC_KEYS.contains(&key)
}

/// Default rows inserted at startup, as (key, value, description)
///
/// `jwt_secret` is not listed here; its initial value is supplied by the caller
/// of [`Setting::seed_defaults`].
pub const DEFAULT_SETTINGS: [(&str, &str, &str); 4] = [
    (APP_NAME_KEY, "Task Manager", "Application name"),
    ("max_tasks_per_user", "1000", "Maximum tasks per user"),
    ("session_timeout", "7", "Session timeout in days"),
    (ALLOW_REGISTRATION_KEY, "true", "Allow new user registration"),
];

impl Setting {
    /// Finds a setting by key
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Lists every setting ordered by key
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(pool)
        .await
    }

    /// Lists the settings whose key is in `keys`, ordered by key
    pub async fn list_by_keys(pool: &PgPool, keys: &[&str]) -> Result<Vec<Self>, sqlx::Error> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        sqlx::query_as::<_, Setting>(
            r#"
            SELECT key, value, description, updated_at
            FROM settings
            WHERE key = ANY($1)
            ORDER BY key
            "#,
        )
        .bind(keys)
        .fetch_all(pool)
        .await
    }

    /// Creates a setting
    ///
    /// Returns `None` without touching the existing row if the key is taken.
    pub async fn create(pool: &PgPool, data: NewSetting) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO NOTHING
            RETURNING key, value, description, updated_at
            "#,
        )
        .bind(data.key)
        .bind(data.value)
        .bind(data.description.unwrap_or_default())
        .fetch_optional(pool)
        .await
    }

    /// Updates a setting's value, and its description when one is given
    ///
    /// Returns `None` if the key does not exist.
    pub async fn update(
        pool: &PgPool,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings
            SET value = $2,
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE key = $1
            RETURNING key, value, description, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a setting, returning false if it did not exist
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Inserts the default settings, leaving existing rows untouched
    ///
    /// `jwt_secret` is seeded with `initial_jwt_secret`. Returns how many rows
    /// were inserted.
    pub async fn seed_defaults(pool: &PgPool, initial_jwt_secret: &str) -> Result<u64, sqlx::Error> {
        let mut inserted = 0;

        let jwt_row = (JWT_SECRET_KEY, initial_jwt_secret, "JWT signing secret");
        for (key, value, description) in DEFAULT_SETTINGS.into_iter().chain(std::iter::once(jwt_row)) {
            let result = sqlx::query(
                r#"
                INSERT INTO settings (key, value, description)
                VALUES ($1, $2, $3)
                ON CONFLICT (key) DO NOTHING
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(description)
            .execute(pool)
            .await?;

            inserted += result.rows_affected();
        }

        tracing::info!(inserted, "Default settings seeded");
        Ok(inserted)
    }

    /// Returns whether registration is currently open
    ///
    /// Only the exact string `"false"` closes registration; a missing row or
    /// any other value leaves it open.
    pub async fn registration_allowed(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let setting = Self::find_by_key(pool, ALLOW_REGISTRATION_KEY).await?;
        Ok(registration_allowed_by(setting.as_ref().map(|s| s.value.as_str())))
    }
}

fn registration_allowed_by(value: Option<&str>) -> bool {
    value != Some("false")
}
