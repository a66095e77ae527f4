//! Task model and database operations
//!
//! This module provides the Task model representing household chores.
//! Tasks are created inside a home, assigned to a member, and carry a
//! point value that is credited to the assignee on completion.
//!
//! # State Machine
//!
//! ```text
//! pending → completed
//! ```
//!
//! One-way, exactly once, and only by the assignee. There is no other
//! transition; the generic update deliberately cannot touch `status` or
//! `completed_at`.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
//! CREATE TYPE task_status AS ENUM ('pending', 'completed');
//!
//! CREATE TABLE tasks (
//!     id SERIAL PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT,
//!     deadline TIMESTAMPTZ,
//!     priority task_priority NOT NULL DEFAULT 'medium',
//!     status task_status NOT NULL DEFAULT 'pending',
//!     points INTEGER NOT NULL DEFAULT 5,
//!     created_by TEXT NOT NULL REFERENCES users(id),
//!     assigned_to TEXT NOT NULL REFERENCES users(id),
//!     home_id TEXT NOT NULL REFERENCES homes(id),
//!     completed_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use choreboard_shared::models::task::{CreateTask, Task, TaskPriority};
//! use choreboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let task = Task::create(&pool, CreateTask {
//!     title: "Wash dishes".to_string(),
//!     description: None,
//!     deadline: None,
//!     priority: TaskPriority::Medium,
//!     points: 10,
//!     created_by: "auth0|ana".to_string(),
//!     assigned_to: "auth0|bruno".to_string(),
//!     home_id: "home-id".to_string(),
//! }).await?;
//!
//! // None would mean the assignee is not a member of the home
//! let task = task.expect("assignee belongs to the home");
//!
//! // The assignee completes it and gets the points
//! let completed = Task::complete(&pool, task.id, "auth0|bruno").await?;
//! assert!(completed.is_some());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use super::home::Home;
use super::user::User;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string for logging and display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is open, waiting for the assignee
    Pending,

    /// Task has been completed and the points credited
    Completed,
}

impl TaskStatus {
    /// Converts status to string for logging and display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Checks if the task is still open
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }
}

/// Task model representing a household chore
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Auto-incrementing task ID
    pub id: i32,

    /// Short description of the chore
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional due date
    pub deadline: Option<DateTime<Utc>>,

    /// Priority (low/medium/high)
    pub priority: TaskPriority,

    /// Completion state
    pub status: TaskStatus,

    /// Points credited to the assignee on completion
    pub points: i32,

    /// User who created the task
    pub created_by: String,

    /// User the task is assigned to
    pub assigned_to: String,

    /// Home the task belongs to
    pub home_id: String,

    /// When the task was completed (None while pending)
    pub completed_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    /// Short description of the chore
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional due date
    pub deadline: Option<DateTime<Utc>>,

    /// Priority, defaults to medium
    #[serde(default)]
    pub priority: TaskPriority,

    /// Point value, defaults to 5
    #[serde(default = "default_points")]
    pub points: i32,

    /// Creating user
    pub created_by: String,

    /// Assigned user; must be a member of `home_id`
    pub assigned_to: String,

    /// Owning home
    pub home_id: String,
}

fn default_points() -> i32 {
    5
}

/// Deserializes a doubly-optional field so that a missing key stays None
/// while an explicit JSON null becomes Some(None)
///
/// Plain `Option<Option<T>>` folds both cases into None, which would make
/// "clear this field" indistinguishable from "leave it alone" in partial
/// updates.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Input for updating a task
///
/// All fields are optional; only present fields are written. Status and
/// completion timestamp are not updatable here — completion goes through
/// [`Task::complete`] only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New deadline (use Some(None) to clear)
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New point value
    pub points: Option<i32>,

    /// Reassign to another user
    pub assigned_to: Option<String>,
}

/// Task aggregate with creator, assignee and home resolved
///
/// Assembled via inner joins: a task whose creator or assignee row is
/// missing would be silently excluded. Users are never deleted in this
/// system, so the case does not arise in practice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithRelations {
    /// The task itself, flattened into the aggregate
    #[serde(flatten)]
    pub task: Task,

    /// Resolved creator record
    pub creator: User,

    /// Resolved assignee record
    pub assignee: User,

    /// Resolved home record
    pub home: Home,
}

/// Shared SELECT for the task aggregate; callers append WHERE/ORDER BY.
const TASK_WITH_RELATIONS_SELECT: &str = r#"
SELECT t.id, t.title, t.description, t.deadline, t.priority, t.status, t.points,
       t.created_by, t.assigned_to, t.home_id, t.completed_at, t.created_at, t.updated_at,
       c.email AS creator_email, c.first_name AS creator_first_name,
       c.last_name AS creator_last_name, c.profile_image_url AS creator_profile_image_url,
       c.points AS creator_points, c.home_id AS creator_home_id,
       c.created_at AS creator_created_at, c.updated_at AS creator_updated_at,
       a.email AS assignee_email, a.first_name AS assignee_first_name,
       a.last_name AS assignee_last_name, a.profile_image_url AS assignee_profile_image_url,
       a.points AS assignee_points, a.home_id AS assignee_home_id,
       a.created_at AS assignee_created_at, a.updated_at AS assignee_updated_at,
       h.name AS home_name, h.created_by AS home_created_by,
       h.created_at AS home_created_at, h.updated_at AS home_updated_at
FROM tasks t
INNER JOIN users c ON c.id = t.created_by
INNER JOIN users a ON a.id = t.assigned_to
INNER JOIN homes h ON h.id = t.home_id
"#;

impl<'r> FromRow<'r, PgRow> for TaskWithRelations {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let task = Task {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            deadline: row.try_get("deadline")?,
            priority: row.try_get("priority")?,
            status: row.try_get("status")?,
            points: row.try_get("points")?,
            created_by: row.try_get("created_by")?,
            assigned_to: row.try_get("assigned_to")?,
            home_id: row.try_get("home_id")?,
            completed_at: row.try_get("completed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        };

        let creator = User {
            id: task.created_by.clone(),
            email: row.try_get("creator_email")?,
            first_name: row.try_get("creator_first_name")?,
            last_name: row.try_get("creator_last_name")?,
            profile_image_url: row.try_get("creator_profile_image_url")?,
            points: row.try_get("creator_points")?,
            home_id: row.try_get("creator_home_id")?,
            created_at: row.try_get("creator_created_at")?,
            updated_at: row.try_get("creator_updated_at")?,
        };

        let assignee = User {
            id: task.assigned_to.clone(),
            email: row.try_get("assignee_email")?,
            first_name: row.try_get("assignee_first_name")?,
            last_name: row.try_get("assignee_last_name")?,
            profile_image_url: row.try_get("assignee_profile_image_url")?,
            points: row.try_get("assignee_points")?,
            home_id: row.try_get("assignee_home_id")?,
            created_at: row.try_get("assignee_created_at")?,
            updated_at: row.try_get("assignee_updated_at")?,
        };

        let home = Home {
            id: task.home_id.clone(),
            name: row.try_get("home_name")?,
            created_by: row.try_get("home_created_by")?,
            created_at: row.try_get("home_created_at")?,
            updated_at: row.try_get("home_updated_at")?,
        };

        Ok(Self {
            task,
            creator,
            assignee,
            home,
        })
    }
}

impl Task {
    /// Creates a new task in pending state
    ///
    /// The insert is guarded on the assignee being a member of the task's
    /// home; an assignee outside the home inserts nothing.
    ///
    /// # Returns
    ///
    /// The created task, or None when the assignee does not belong to
    /// `home_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced user or home does not exist
    /// (foreign key violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, deadline, priority, points,
                               created_by, assigned_to, home_id)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8
            WHERE EXISTS (SELECT 1 FROM users WHERE id = $7 AND home_id = $8)
            RETURNING id, title, description, deadline, priority, status, points,
                      created_by, assigned_to, home_id, completed_at, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.priority)
        .bind(data.points)
        .bind(data.created_by)
        .bind(data.assigned_to)
        .bind(data.home_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with creator, assignee and home resolved
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<TaskWithRelations>, sqlx::Error> {
        let query = format!("{TASK_WITH_RELATIONS_SELECT} WHERE t.id = $1");

        let task = sqlx::query_as::<_, TaskWithRelations>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists all tasks of a home, most recent first
    pub async fn list_by_home(
        pool: &PgPool,
        home_id: &str,
    ) -> Result<Vec<TaskWithRelations>, sqlx::Error> {
        let query = format!(
            "{TASK_WITH_RELATIONS_SELECT} WHERE t.home_id = $1 ORDER BY t.created_at DESC, t.id DESC"
        );

        let tasks = sqlx::query_as::<_, TaskWithRelations>(&query)
            .bind(home_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists all tasks assigned to a user, most recent first
    pub async fn list_by_assignee(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<TaskWithRelations>, sqlx::Error> {
        let query = format!(
            "{TASK_WITH_RELATIONS_SELECT} WHERE t.assigned_to = $1 ORDER BY t.created_at DESC, t.id DESC"
        );

        let tasks = sqlx::query_as::<_, TaskWithRelations>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task
    ///
    /// Only present fields are written; `updated_at` is always refreshed.
    /// No authorization happens at this layer — the API enforces that only
    /// the creator may edit.
    ///
    /// # Returns
    ///
    /// The updated task, or None if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.deadline.is_some() {
            bind_count += 1;
            query.push_str(&format!(", deadline = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.points.is_some() {
            bind_count += 1;
            query.push_str(&format!(", points = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, deadline, priority, status, \
             points, created_by, assigned_to, home_id, completed_at, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(deadline) = data.deadline {
            q = q.bind(deadline);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(points) = data.points {
            q = q.bind(points);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Completes a task and credits its points to the assignee
    ///
    /// The assignee match is part of the UPDATE's WHERE clause (combined
    /// match, not check-then-act), together with the pending guard, so a
    /// task completes exactly once and only for its assignee. The status
    /// flip and the points credit run in one transaction; either both
    /// happen or neither does.
    ///
    /// # Returns
    ///
    /// The completed task, or None if no row matched — task unknown,
    /// caller not the assignee, or already completed. Nothing is written
    /// in that case.
    pub async fn complete(
        pool: &PgPool,
        id: i32,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'completed',
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND assigned_to = $2 AND status = 'pending'
            RETURNING id, title, description, deadline, priority, status, points,
                      created_by, assigned_to, home_id, completed_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(task) = task else {
            // No match: dropping the transaction rolls back the no-op
            return Ok(None);
        };

        User::add_points(&mut *tx, user_id, task.points).await?;

        tx.commit().await?;

        Ok(Some(task))
    }
}
