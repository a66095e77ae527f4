//! Task endpoints
//!
//! Tasks are chores created inside the caller's home and assigned to one
//! of its members. Completing a task credits its point value to the
//! assignee.
//!
//! # Endpoints
//!
//! - `POST  /v1/tasks` — create a task in the caller's home
//! - `GET   /v1/tasks` — all tasks of the caller's home
//! - `GET   /v1/tasks/my` — tasks assigned to the caller
//! - `PATCH /v1/tasks/:id` — partial update, creator only
//! - `POST  /v1/tasks/:id/complete` — complete a task, assignee only
//!
//! # Example Request
//!
//! ```json
//! {
//!   "title": "Wash dishes",
//!   "assignedTo": "auth0|bruno",
//!   "priority": "high",
//!   "deadline": "2025-08-02T18:00:00Z",
//!   "points": 10
//! }
//! ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::identity::Identity;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use choreboard_shared::models::task::{
    double_option, CreateTask, Task, TaskPriority, TaskWithRelations, UpdateTask,
};
use choreboard_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create task request
///
/// `createdBy` and `homeId` are never taken from the client; they are
/// injected from the caller's identity and current home.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Short description of the chore
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Member the task is assigned to
    #[validate(length(min = 1))]
    pub assigned_to: String,

    /// Priority, defaults to medium
    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional due date
    pub deadline: Option<DateTime<Utc>>,

    /// Point value, defaults to 5
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    5
}

/// Update task request
///
/// All fields optional; a JSON null clears description/deadline while a
/// missing key leaves the field untouched. Status is deliberately not
/// here — completion has its own endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    /// New description (null clears)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New deadline (null clears)
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New point value
    #[validate(range(min = 1, max = 50))]
    pub points: Option<i32>,

    /// Reassign to another member
    #[validate(length(min = 1))]
    pub assigned_to: Option<String>,
}

/// Complete task response
#[derive(Debug, Clone, Serialize)]
pub struct CompleteTaskResponse {
    /// The completed task
    pub task: Task,

    /// Confirmation message for the client
    pub message: String,
}

/// Create task handler
///
/// # Errors
///
/// - 422: invalid title/points
/// - 400: caller does not belong to a home, or the assignee is not a
///   member of it
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    request.validate()?;

    let home_id = caller_home(&state, &identity.user_id).await?.ok_or_else(|| {
        ApiError::BadRequest("You must be part of a home to create tasks".to_string())
    })?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: request.title,
            description: request.description,
            deadline: request.deadline,
            priority: request.priority,
            points: request.points,
            created_by: identity.user_id.clone(),
            assigned_to: request.assigned_to,
            home_id,
        },
    )
    .await?
    .ok_or_else(|| {
        ApiError::BadRequest("Assignee must be a member of your home".to_string())
    })?;

    tracing::info!(
        task_id = task.id,
        home_id = %task.home_id,
        user_id = %identity.user_id,
        assigned_to = %task.assigned_to,
        points = task.points,
        "Task created"
    );

    Ok(Json(task))
}

/// List tasks handler
///
/// Returns all tasks of the caller's home, most recent first, each with
/// creator, assignee and home resolved.
///
/// # Errors
///
/// - 400: caller does not belong to a home
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<TaskWithRelations>>> {
    let home_id = caller_home(&state, &identity.user_id).await?.ok_or_else(|| {
        ApiError::BadRequest("You must be part of a home to view tasks".to_string())
    })?;

    let tasks = Task::list_by_home(&state.db, &home_id).await?;

    Ok(Json(tasks))
}

/// My tasks handler
///
/// Returns the tasks assigned to the caller, most recent first. Does not
/// require home membership: reassignment could in principle leave a task
/// pointing at a user who moved out.
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<TaskWithRelations>>> {
    let tasks = Task::list_by_assignee(&state.db, &identity.user_id).await?;

    Ok(Json(tasks))
}

/// Update task handler
///
/// Applies a partial update. Only the creator may edit a task; the check
/// lives here because the storage layer is authorization-free.
///
/// # Errors
///
/// - 404: task does not exist
/// - 403: caller is not the task's creator
/// - 422: invalid field values
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i32>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    request.validate()?;

    let existing = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if existing.task.created_by != identity.user_id {
        return Err(ApiError::Forbidden(
            "Only the task creator can edit it".to_string(),
        ));
    }

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: request.title,
            description: request.description,
            deadline: request.deadline,
            priority: request.priority,
            points: request.points,
            assigned_to: request.assigned_to,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = task.id, user_id = %identity.user_id, "Task updated");

    Ok(Json(task))
}

/// Complete task handler
///
/// The assignee match inside [`Task::complete`] is the sole authorization
/// gate: an unknown task, a non-assignee caller and an already-completed
/// task all surface as the same 404.
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<i32>,
) -> ApiResult<Json<CompleteTaskResponse>> {
    let task = Task::complete(&state.db, task_id, &identity.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Task not found or not assigned to you".to_string())
        })?;

    tracing::info!(
        task_id = task.id,
        user_id = %identity.user_id,
        points = task.points,
        "Task completed, points awarded"
    );

    Ok(Json(CompleteTaskResponse {
        task,
        message: "Task completed successfully! Points awarded!".to_string(),
    }))
}

/// Resolves the caller's current home, if any
async fn caller_home(state: &AppState, user_id: &str) -> Result<Option<String>, ApiError> {
    let user = User::find_by_id(&state.db, user_id).await?;
    Ok(user.and_then(|u| u.home_id))
}
