/// Authorization helpers
///
/// TaskTrack has two privilege levels: regular users, who only ever touch
/// their own tasks, and administrators, who additionally manage settings.
/// Task ownership is enforced inside the task queries themselves (see
/// [`crate::models::task`]); this module covers the admin flag.
///
/// The admin flag is read from the database on every check rather than carried
/// in the token, so demoting a user takes effect immediately.

use sqlx::PgPool;

use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The user id from the token no longer matches a user row
    #[error("User {0} does not exist")]
    UnknownUser(i64),

    /// User exists but is not an administrator
    #[error("User {0} is not an administrator")]
    NotAdmin(i64),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Returns whether `user_id` belongs to an existing administrator
pub async fn is_admin(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    Ok(User::find_by_id(pool, user_id)
        .await?
        .map(|u| u.is_admin)
        .unwrap_or(false))
}

/// Requires `user_id` to be an existing administrator
///
/// # Errors
///
/// - [`AuthzError::UnknownUser`] if the user row is gone
/// - [`AuthzError::NotAdmin`] if the admin flag is false
pub async fn require_admin(pool: &PgPool, user_id: i64) -> Result<User, AuthzError> {
    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthzError::UnknownUser(user_id))?;

    if !user.is_admin {
        return Err(AuthzError::NotAdmin(user_id));
    }

    Ok(user)
}
