/// Task endpoints
///
/// Every handler acts on the authenticated user's own tasks only. A task that
/// belongs to someone else answers exactly like one that does not exist (404).
///
/// - `GET /api/tasks` - List own tasks, newest first
/// - `GET /api/tasks/:id` - Fetch one task
/// - `POST /api/tasks` - Create a task
/// - `PUT /api/tasks/:id` - Update a task
/// - `DELETE /api/tasks/:id` - Delete a task

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
use tasktrack_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus},
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,

    pub description: Option<String>,

    /// `low`, `medium` or `high`; defaults to `medium`
    pub priority: Option<String>,
}

/// Update task request; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// Ignored when empty
    pub title: Option<String>,

    /// Replaces the stored description even when empty
    pub description: Option<String>,

    pub status: Option<String>,

    pub priority: Option<String>,
}

impl UpdateTaskRequest {
    fn into_changes(self) -> ApiResult<TaskChanges> {
        Ok(TaskChanges {
            title: self.title.filter(|t| !t.is_empty()),
            description: self.description,
            status: self.status.as_deref().map(parse_status).transpose()?,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
        })
    }
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    raw.parse().map_err(ApiError::BadRequest)
}

fn parse_priority(raw: &str) -> ApiResult<TaskPriority> {
    raw.parse().map_err(ApiError::BadRequest)
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_for_owner(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    Task::find_owned(&state.db, id, auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(task_not_found)
}

/// Create a task
///
/// Status always starts as `pending`.
///
/// # Errors
///
/// - `400 Bad Request`: missing title or unknown priority
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let priority = match req.priority.as_deref() {
        Some(raw) => parse_priority(raw)?,
        None => TaskPriority::default(),
    };

    let task = Task::create(
        &state.db,
        auth.user_id,
        NewTask {
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            priority,
        },
    )
    .await?;

    tracing::debug!(user_id = auth.user_id, task_id = task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task
///
/// # Errors
///
/// - `400 Bad Request`: unknown status or priority
/// - `404 Not Found`: no such task for this user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let changes = req.into_changes()?;

    Task::update_owned(&state.db, id, auth.user_id, changes)
        .await?
        .map(Json)
        .ok_or_else(task_not_found)
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !Task::delete_owned(&state.db, id, auth.user_id).await? {
        return Err(task_not_found());
    }

    tracing::debug!(user_id = auth.user_id, task_id = id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
