/// Authentication and admin middleware
///
/// [`jwt_auth_layer`] wraps every route except registration, login, and the
/// health checks. [`admin_layer`] is stacked inside it on the settings
/// mutations, so it always sees the [`AuthContext`] the auth layer inserted.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tasktrack_shared::auth::{
    authorization::{require_admin, AuthzError},
    middleware::{authenticate, AuthContext},
};

use crate::{app::AppState, error::ApiError};

/// Verifies the bearer token and injects [`AuthContext`] into request extensions
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(&state.tokens, req.headers()).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Lets the request through only if the authenticated user is an administrator
///
/// The admin flag is read from the database on every request.
pub async fn admin_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    match require_admin(&state.db, auth.user_id).await {
        Ok(_) => Ok(next.run(req).await),
        Err(err @ (AuthzError::NotAdmin(_) | AuthzError::UnknownUser(_))) => {
            tracing::warn!(
                user_id = auth.user_id,
                method = %req.method(),
                path = %req.uri().path(),
                "Admin access denied"
            );
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
