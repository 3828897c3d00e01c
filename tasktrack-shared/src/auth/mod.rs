/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password length rule
/// - [`secret`]: Resolution of the live JWT signing secret
/// - [`jwt`]: Session token claims and the [`jwt::TokenService`]
/// - [`middleware`]: Bearer extraction and request authentication context
/// - [`authorization`]: Admin checks
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sqlx::PgPool;
/// use tasktrack_shared::auth::jwt::TokenService;
/// use tasktrack_shared::auth::password::{hash_password, verify_password};
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::new(Arc::new(pool), None);
/// let token = tokens.issue(42).await?;
/// assert_eq!(tokens.verify(&token).await?, 42);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod secret;
