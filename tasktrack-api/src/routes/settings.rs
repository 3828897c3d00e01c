/// Settings endpoints
///
/// Reads need any valid token; writes are wrapped in the admin layer.
/// Non-admins only ever see the public keys (`app_name`,
/// `allow_registration`); any other key answers 404 for them.
///
/// Changing `jwt_secret` here rotates the signing secret: every token issued
/// before the change stops verifying on the next request.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use tasktrack_shared::{
    auth::{authorization::is_admin, middleware::AuthContext},
    models::setting::{is_public_key, NewSetting, Setting, PUBLIC_KEYS},
};

/// Body for creating or updating a setting
///
/// `value` may be any JSON scalar; see [`value_text`].
#[derive(Debug, Default, Deserialize)]
pub struct SettingRequest {
    pub key: Option<String>,
    pub value: Option<Value>,
    pub description: Option<String>,
}

/// Converts a JSON value to its stored text form
///
/// Strings are stored verbatim; other values as their JSON text. `null`
/// counts as missing.
fn value_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn setting_not_found() -> ApiError {
    ApiError::NotFound("Setting not found".to_string())
}

/// List settings
///
/// Administrators get every row; everyone else gets the public keys.
pub async fn list_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Setting>>> {
    let settings = if is_admin(&state.db, auth.user_id).await? {
        Setting::list_all(&state.db).await?
    } else {
        Setting::list_by_keys(&state.db, &PUBLIC_KEYS).await?
    };

    Ok(Json(settings))
}

pub async fn get_setting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
) -> ApiResult<Json<Setting>> {
    if !is_public_key(&key) && !is_admin(&state.db, auth.user_id).await? {
        return Err(setting_not_found());
    }

    Setting::find_by_key(&state.db, &key)
        .await?
        .map(Json)
        .ok_or_else(setting_not_found)
}

/// Create a setting from `{key, value, description?}` (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: missing key or value, or the key already exists
pub async fn create_setting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<SettingRequest>,
) -> ApiResult<(StatusCode, Json<Setting>)> {
    let key = req.key.clone().filter(|k| !k.is_empty());
    insert_setting(&state, auth, key, req).await
}

/// Create a setting whose key comes from the path (admin only)
pub async fn create_setting_at_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<SettingRequest>,
) -> ApiResult<(StatusCode, Json<Setting>)> {
    insert_setting(&state, auth, Some(key), req).await
}

async fn insert_setting(
    state: &AppState,
    auth: AuthContext,
    key: Option<String>,
    req: SettingRequest,
) -> ApiResult<(StatusCode, Json<Setting>)> {
    let (key, value) = match (key, value_text(req.value)) {
        (Some(key), Some(value)) => (key, value),
        _ => {
            return Err(ApiError::BadRequest(
                "Key and value are required".to_string(),
            ))
        }
    };

    let setting = Setting::create(
        &state.db,
        NewSetting {
            key,
            value,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::Conflict("Setting already exists".to_string()))?;

    tracing::info!(user_id = auth.user_id, key = %setting.key, "Setting created");

    Ok((StatusCode::CREATED, Json(setting)))
}

/// Update a setting's value, and its description when given (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: missing value
/// - `404 Not Found`: no such key
pub async fn update_setting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<SettingRequest>,
) -> ApiResult<Json<Setting>> {
    let value = value_text(req.value)
        .ok_or_else(|| ApiError::BadRequest("Value is required".to_string()))?;

    let setting = Setting::update(&state.db, &key, &value, req.description.as_deref())
        .await?
        .ok_or_else(setting_not_found)?;

    tracing::info!(user_id = auth.user_id, key = %setting.key, "Setting updated");

    Ok(Json(setting))
}

pub async fn delete_setting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !Setting::delete(&state.db, &key).await? {
        return Err(setting_not_found());
    }

    tracing::info!(user_id = auth.user_id, key = %key, "Setting deleted");

    Ok(Json(MessageResponse {
        message: "Setting deleted successfully".to_string(),
    }))
}
