/// JWT signing secret resolution
///
/// The signing secret is not a fixed deployment value: it lives in the
/// `settings` table under [`JWT_SECRET_KEY`] and administrators can change it
/// at runtime. Every token operation resolves it again through
/// [`resolve_jwt_secret`], so a rotation takes effect on the very next request
/// and invalidates every token signed with the old value.
///
/// # Precedence
///
/// 1. The `jwt_secret` settings row (if present and not blank)
/// 2. The environment fallback (`JWT_SECRET`, if set and not blank)
/// 3. [`DEV_FALLBACK_SECRET`]

use async_trait::async_trait;
use rand::Rng;
use sqlx::PgPool;

use crate::models::setting::Setting;

/// Settings key holding the live signing secret
pub const JWT_SECRET_KEY: &str = "jwt_secret";

/// Last-resort secret used when neither the store nor the environment provide one
pub const DEV_FALLBACK_SECRET: &str = "fallback-secret-please-change-in-settings";

/// Length of secrets produced by [`generate_secret`]
pub const GENERATED_SECRET_LENGTH: usize = 48;

/// Read access to the settings store
///
/// Implemented for [`PgPool`]; tests substitute an in-memory map.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is no such row
    async fn setting_value(&self, key: &str) -> Result<Option<String>, sqlx::Error>;
}

#[async_trait]
impl SettingsSource for PgPool {
    async fn setting_value(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(Setting::find_by_key(self, key).await?.map(|s| s.value))
    }
}

/// Resolves the secret to sign and verify tokens with
///
/// # Errors
///
/// Returns the store error if the settings lookup fails. A failing store never
/// silently falls through to the weaker fallbacks.
pub async fn resolve_jwt_secret(
    source: &dyn SettingsSource,
    env_fallback: Option<&str>,
) -> Result<String, sqlx::Error> {
    if let Some(stored) = source.setting_value(JWT_SECRET_KEY).await? {
        if !stored.trim().is_empty() {
            return Ok(stored);
        }
        tracing::warn!("Stored jwt_secret is blank, ignoring it");
    }

    if let Some(env_secret) = env_fallback.filter(|s| !s.trim().is_empty()) {
        return Ok(env_secret.to_string());
    }

    tracing::warn!("No jwt_secret configured, using the development fallback secret");
    Ok(DEV_FALLBACK_SECRET.to_string())
}

/// Generates a random alphanumeric secret for seeding a fresh database
///
/// 62^48 possible values, drawn from `rand::thread_rng()`.
pub fn generate_secret() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..GENERATED_SECRET_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
