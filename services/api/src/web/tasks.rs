//! services/api/src/web/tasks.rs
//!
//! Handlers for the owner-scoped task CRUD and status endpoints. Every
//! handler here sits behind `require_auth` and reads the caller's identity
//! from request extensions; the task store never sees an unscoped request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use task_tracker_core::domain::{Task, TaskStatus};
use utoipa::ToSchema;

use crate::web::middleware::AuthedUser;
use crate::web::port_error_response;
use crate::web::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Calendar date as `YYYY-MM-DD`. Omitted, empty, or unparseable input
    /// defaults to today.
    pub date: Option<String>,
}

/// A task as it appears on the wire. Dates serialize as `YYYY-MM-DD`.
#[derive(Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// One of `Pending`, `In Progress`, `Completed`.
    #[schema(value_type = String, example = "Pending")]
    pub status: TaskStatus,
    pub date: NaiveDate,
    pub user_id: i64,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            status: task.status,
            date: task.date,
            user_id: task.user_id,
        }
    }
}

fn to_response_list(tasks: Vec<Task>) -> Json<Vec<TaskResponse>> {
    Json(tasks.into_iter().map(TaskResponse::from).collect())
}

fn parse_date_or_today(date: Option<&str>) -> NaiveDate {
    date.and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        .unwrap_or_else(|| Utc::now().date_naive())
}

//=========================================================================================
// CRUD Handlers
//=========================================================================================

/// GET /tasks - List all tasks owned by the caller
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "The caller's tasks, possibly empty", body = [TaskResponse]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tasks = state
        .tasks
        .list_tasks(user_id)
        .await
        .map_err(|e| port_error_response("Database read error", e))?;
    Ok(to_response_list(tasks))
}

/// GET /tasks/{id} - Fetch a single owned task
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such task owned by the caller")
    )
)]
pub async fn get_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let task = state
        .tasks
        .get_task(user_id, task_id)
        .await
        .map_err(|e| port_error_response("Database read error", e))?;
    Ok(Json(TaskResponse::from(task)))
}

/// POST /tasks/create - Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/tasks/create",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created task, status always Pending", body = TaskResponse),
        (status = 400, description = "Missing task name"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let name = match req.name {
        Some(name) if !name.is_empty() => name,
        _ => return Err((StatusCode::BAD_REQUEST, "name is required".to_string())),
    };
    let description = req.description.unwrap_or_default();
    let date = parse_date_or_today(req.date.as_deref());

    let task = state
        .tasks
        .create_task(user_id, &name, &description, date)
        .await
        .map_err(|e| port_error_response("Database write error", e))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// DELETE /tasks/delete/{id} - Delete an owned task
#[utoipa::path(
    delete,
    path = "/tasks/delete/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such task owned by the caller")
    )
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .tasks
        .delete_task(user_id, task_id)
        .await
        .map_err(|e| port_error_response("Database error during deletion", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Status Filters
//=========================================================================================

async fn list_with_status(
    state: Arc<AppState>,
    user_id: i64,
    status: TaskStatus,
) -> Result<Json<Vec<TaskResponse>>, (StatusCode, String)> {
    // No-match is an empty array, never a 404.
    let tasks = state
        .tasks
        .list_by_status(user_id, status)
        .await
        .map_err(|e| port_error_response("Database read error", e))?;
    Ok(to_response_list(tasks))
}

/// GET /tasks/pending - Owned tasks with status Pending
#[utoipa::path(
    get,
    path = "/tasks/pending",
    responses(
        (status = 200, description = "Matching tasks, possibly empty", body = [TaskResponse]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_pending_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_with_status(state, user_id, TaskStatus::Pending).await
}

/// GET /tasks/completed - Owned tasks with status Completed
#[utoipa::path(
    get,
    path = "/tasks/completed",
    responses(
        (status = 200, description = "Matching tasks, possibly empty", body = [TaskResponse]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_completed_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_with_status(state, user_id, TaskStatus::Completed).await
}

/// GET /tasks/in-progress - Owned tasks with status In Progress
#[utoipa::path(
    get,
    path = "/tasks/in-progress",
    responses(
        (status = 200, description = "Matching tasks, possibly empty", body = [TaskResponse]),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn list_in_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_with_status(state, user_id, TaskStatus::InProgress).await
}

//=========================================================================================
// Status Transitions
//=========================================================================================

async fn set_status_for(
    state: Arc<AppState>,
    user_id: i64,
    task_id: i64,
    status: TaskStatus,
) -> Result<Json<TaskResponse>, (StatusCode, String)> {
    let task = state
        .tasks
        .set_status(user_id, task_id, status)
        .await
        .map_err(|e| port_error_response("Database write error", e))?;
    Ok(Json(TaskResponse::from(task)))
}

/// POST|PATCH /tasks/complete/{id} - Move an owned task to Completed
#[utoipa::path(
    post,
    path = "/tasks/complete/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such task owned by the caller")
    )
)]
pub async fn complete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_status_for(state, user_id, task_id, TaskStatus::Completed).await
}

/// POST|PATCH /tasks/in-progress/{id} - Move an owned task to In Progress
#[utoipa::path(
    post,
    path = "/tasks/in-progress/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such task owned by the caller")
    )
)]
pub async fn start_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_status_for(state, user_id, task_id, TaskStatus::InProgress).await
}

/// POST|PATCH /tasks/pending/{id} - Move an owned task back to Pending
#[utoipa::path(
    post,
    path = "/tasks/pending/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No such task owned by the caller")
    )
)]
pub async fn reset_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_status_for(state, user_id, task_id, TaskStatus::Pending).await
}
