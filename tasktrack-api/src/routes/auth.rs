/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account and receive a token
/// - `POST /api/auth/login` - Exchange email and password for a token
///
/// Both respond with the same shape:
///
/// ```json
/// {
///   "message": "Login successful",
///   "token": "eyJ...",
///   "user": { "id": 1, "username": "alice", "email": "a@x.com", "isAdmin": true }
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::password,
    models::{
        setting::Setting,
        user::{NewUser, User, UserProfile},
    },
};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register request
///
/// Absent, `null`, and empty fields all count as missing.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "All fields are required"),
        length(min = 1, message = "All fields are required")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "All fields are required"),
        length(min = 1, message = "All fields are required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "All fields are required"),
        length(min = 1, message = "All fields are required")
    )]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email and password are required"),
        length(min = 1, message = "Email and password are required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Email and password are required"),
        length(min = 1, message = "Email and password are required")
    )]
    pub password: Option<String>,
}

/// Token response shared by register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// Register a new user
///
/// The first account ever created becomes an administrator.
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, short password, registration
///   disabled, or username/email already taken
/// - `500 Internal Server Error`: store failure
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let username = req.username.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let plain_password = req.password.unwrap_or_default();

    password::validate_password_length(&plain_password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    if !Setting::registration_allowed(&state.db).await? {
        return Err(ApiError::BadRequest(
            "Registration is currently disabled".to_string(),
        ));
    }

    let password_hash = password::hash_password(&plain_password)?;

    let user = User::register(
        &state.db,
        NewUser {
            username,
            email,
            password_hash,
        },
    )
    .await?;

    let token = state.tokens.issue(user.id).await?;

    tracing::info!(user_id = user.id, is_admin = user.is_admin, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

/// Log in with email and password
///
/// An unknown email and a wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let email = req.email.unwrap_or_default();
    let plain_password = req.password.unwrap_or_default();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&plain_password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(user.id).await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserProfile::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        let err = ApiError::from(req.validate().unwrap_err());

        match err {
            ApiError::ValidationError(details) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
                assert!(details.iter().all(|d| d.message == "All fields are required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_register_complete_request_validates() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username": "alice", "email": "a@x.com", "password": "secret1"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_null_and_empty_fields_are_missing() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username": "alice", "email": null, "password": ""}"#,
        )
        .unwrap();

        match ApiError::from(req.validate().unwrap_err()) {
            ApiError::ValidationError(details) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
