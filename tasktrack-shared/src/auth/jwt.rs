/// Session token generation and validation
///
/// Session tokens are HS256-signed JWTs carrying the user id. They are never
/// stored server-side: a token stays valid until it expires (7 days after
/// issuance) or until the signing secret is rotated.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Fixed 7 days, validated with zero leeway
/// - **Validation**: Signature, expiration, and issuer checks
/// - **Secret**: Resolved per call from the settings store, see [`super::secret`]
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(7);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.user_id, 7);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::secret::{resolve_jwt_secret, SettingsSource};

/// Issuer embedded in and required from every token
pub const TOKEN_ISSUER: &str = "tasktrack";

/// Fixed lifetime of a session token
pub fn token_lifetime() -> Duration {
    Duration::days(7)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// The signing secret could not be read from the settings store
    #[error("Signing secret unavailable: {0}")]
    SecretUnavailable(#[from] sqlx::Error),
}

/// JWT claims structure
///
/// `userId` keeps the wire name used by existing clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Issuer - always [`TOKEN_ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring [`token_lifetime`] from now
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, token_lifetime())
    }

    /// Creates claims with a custom expiration
    ///
    /// Negative durations produce already-expired claims, which is handy in tests.
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Signs `claims` with HS256 using `secret`
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token against `secret` and extracts its claims
///
/// Verifies the signature, the issuer, and that `exp` has not passed. No
/// clock-skew leeway is granted, so a token is rejected the second it expires.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issues and verifies session tokens with the live signing secret
///
/// Holds no secret of its own: each call resolves the secret through the
/// injected [`SettingsSource`], falling back to `fallback_secret` (the
/// `JWT_SECRET` environment value) and then the development default.
#[derive(Clone)]
pub struct TokenService {
    settings: Arc<dyn SettingsSource>,
    fallback_secret: Option<Arc<str>>,
}

impl TokenService {
    /// Creates a token service reading its secret from `settings`
    pub fn new(settings: Arc<dyn SettingsSource>, fallback_secret: Option<String>) -> Self {
        Self {
            settings,
            fallback_secret: fallback_secret.map(Arc::from),
        }
    }

    /// Resolves the secret currently in force
    pub async fn current_secret(&self) -> Result<String, JwtError> {
        let secret =
            resolve_jwt_secret(self.settings.as_ref(), self.fallback_secret.as_deref()).await?;
        Ok(secret)
    }

    /// Issues a 7-day token for `user_id`, signed with the current secret
    pub async fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        let secret = self.current_secret().await?;
        create_token(&Claims::new(user_id), &secret)
    }

    /// Verifies `token` against the current secret and returns its user id
    pub async fn verify(&self, token: &str) -> Result<i64, JwtError> {
        let secret = self.current_secret().await?;
        let claims = validate_token(token, &secret)?;
        Ok(claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::secret::testing::MemorySettings;
    use crate::auth::secret::{DEV_FALLBACK_SECRET, JWT_SECRET_KEY};

    fn service_with(store: Arc<MemorySettings>, fallback: Option<&str>) -> TokenService {
        TokenService::new(store, fallback.map(str::to_string))
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(42);

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, token_lifetime().num_seconds());
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_claims_serialize_user_id_as_camel_case() {
        let json = serde_json::to_value(Claims::new(3)).unwrap();
        assert_eq!(json["userId"], 3);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_create_and_validate_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";

        let token = create_token(&Claims::new(9), secret).expect("Should create token");
        let validated = validate_token(&token, secret).expect("Should validate token");

        assert_eq!(validated.user_id, 9);
        assert_eq!(validated.iss, TOKEN_ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new(1), "secret1").expect("Should create token");
        let result = validate_token(&token, "wrong-secret");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(1, Duration::seconds(-3600));
        assert!(claims.exp < Utc::now().timestamp());

        let token = create_token(&claims, "test-secret").expect("Should create token");
        let result = validate_token(&token, "test-secret");
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_just_past_expiry_is_rejected() {
        // Inside the default 60s leeway of jsonwebtoken, but we grant none
        let claims = Claims::with_expiration(1, Duration::seconds(-5));
        let token = create_token(&claims, "test-secret").unwrap();
        assert!(matches!(
            validate_token(&token, "test-secret"),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_near_end_of_window_still_valid() {
        let claims = Claims::with_expiration(5, token_lifetime() - Duration::seconds(1));
        let token = create_token(&claims, "test-secret").unwrap();
        assert_eq!(validate_token(&token, "test-secret").unwrap().user_id, 5);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(1);
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, "test-secret").unwrap();
        assert!(validate_token(&token, "test-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_token("not.a.jwt", "test-secret").is_err());
        assert!(validate_token("", "test-secret").is_err());
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let store = Arc::new(MemorySettings::with(JWT_SECRET_KEY, "stored-secret"));
        let tokens = service_with(store, None);

        let token = tokens.issue(77).await.unwrap();
        assert_eq!(tokens.verify(&token).await.unwrap(), 77);

        // Signed with the stored secret, not the fallbacks
        assert!(validate_token(&token, "stored-secret").is_ok());
        assert!(validate_token(&token, DEV_FALLBACK_SECRET).is_err());
    }

    #[tokio::test]
    async fn test_rotation_invalidates_earlier_tokens() {
        let store = Arc::new(MemorySettings::with(JWT_SECRET_KEY, "first-secret"));
        let tokens = service_with(store.clone(), Some("env-secret"));

        let before = tokens.issue(1).await.unwrap();
        assert_eq!(tokens.verify(&before).await.unwrap(), 1);

        store.set(JWT_SECRET_KEY, "second-secret");

        assert!(tokens.verify(&before).await.is_err());
        let after = tokens.issue(1).await.unwrap();
        assert_eq!(tokens.verify(&after).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_stored_secret_falls_back_to_env() {
        let store = Arc::new(MemorySettings::with(JWT_SECRET_KEY, "stored-secret"));
        let tokens = service_with(store.clone(), Some("env-secret"));

        let stored_token = tokens.issue(4).await.unwrap();
        store.remove(JWT_SECRET_KEY);

        assert!(tokens.verify(&stored_token).await.is_err());
        let env_token = tokens.issue(4).await.unwrap();
        assert!(validate_token(&env_token, "env-secret").is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let tokens = service_with(Arc::new(MemorySettings::failing()), Some("env-secret"));
        assert!(matches!(
            tokens.issue(1).await,
            Err(JwtError::SecretUnavailable(_))
        ));
        assert!(matches!(
            tokens.verify("whatever").await,
            Err(JwtError::SecretUnavailable(_))
        ));
    }
}
