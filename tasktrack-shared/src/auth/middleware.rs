/// Request authentication for Axum
///
/// Extracts the bearer token from the `Authorization` header, verifies it with
/// the [`TokenService`], and produces the [`AuthContext`] that the API's auth
/// layer inserts into request extensions for downstream handlers.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use tasktrack_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{JwtError, TokenService};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id, taken from the verified token
    pub user_id: i64,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Bearer` header
    #[error("Authentication required")]
    MissingCredentials,

    /// Token failed verification. The reason is logged, never returned.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The signing secret could not be resolved
    #[error("Signing secret unavailable: {0}")]
    SecretUnavailable(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::SecretUnavailable(e) => AuthError::SecretUnavailable(e.to_string()),
            other => {
                tracing::debug!(error = %other, "Rejected session token");
                AuthError::InvalidToken
            }
        }
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingCredentials)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Authenticates a request from its headers
pub async fn authenticate(
    tokens: &TokenService,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let user_id = tokens.verify(token).await?;
    Ok(AuthContext { user_id })
}
