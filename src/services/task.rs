//! To-do task service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const DEFAULT_PRIORITY: &str = "medium";
const DEFAULT_CATEGORY: &str = "personal";

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task not found")]
    NotFound(i64),
    #[error("task title is required")]
    MissingTitle,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub category: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub user_email: String,
}

/// Create/replace payload. The web client sends empty strings for unset
/// fields, including `dueDate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub due_date: Option<NaiveDate>,
    pub user_email: String,
}

impl TaskInput {
    fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::MissingTitle);
        }
        Ok(())
    }

    fn priority(&self) -> &str {
        non_blank(self.priority.as_deref()).unwrap_or(DEFAULT_PRIORITY)
    }

    fn category(&self) -> &str {
        non_blank(self.category.as_deref()).unwrap_or(DEFAULT_CATEGORY)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Tasks belonging to one user, oldest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_tasks_for_user(pool: &PgPool, email: &str) -> Result<Vec<Task>, TaskError> {
    let tasks = sqlx::query_as::<_, Task>(
        r"SELECT id, title, description, priority, category, completed, due_date, user_email
          FROM tasks WHERE user_email = $1 ORDER BY id",
    )
    .bind(email.trim().to_ascii_lowercase())
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

/// Create a task.
///
/// # Errors
///
/// Returns [`TaskError::MissingTitle`] for blank titles.
pub async fn create_task(pool: &PgPool, input: &TaskInput) -> Result<Task, TaskError> {
    input.validate()?;
    let task = sqlx::query_as::<_, Task>(
        r"INSERT INTO tasks (title, description, priority, category, completed, due_date, user_email)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id, title, description, priority, category, completed, due_date, user_email",
    )
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(input.priority())
    .bind(input.category())
    .bind(input.completed)
    .bind(input.due_date)
    .bind(input.user_email.trim().to_ascii_lowercase())
    .fetch_one(pool)
    .await?;
    Ok(task)
}

/// Replace a task's editable fields. Ownership (`user_email`) is not changed.
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] when no task has this id.
pub async fn update_task(pool: &PgPool, id: i64, input: &TaskInput) -> Result<Task, TaskError> {
    input.validate()?;
    let task = sqlx::query_as::<_, Task>(
        r"UPDATE tasks
          SET title = $2, description = $3, priority = $4, category = $5, completed = $6, due_date = $7
          WHERE id = $1
          RETURNING id, title, description, priority, category, completed, due_date, user_email",
    )
    .bind(id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(input.priority())
    .bind(input.category())
    .bind(input.completed)
    .bind(input.due_date)
    .fetch_optional(pool)
    .await?;
    task.ok_or(TaskError::NotFound(id))
}

/// Delete a task.
///
/// # Errors
///
/// Returns [`TaskError::NotFound`] when no task has this id.
pub async fn delete_task(pool: &PgPool, id: i64) -> Result<(), TaskError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(TaskError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "task_test.rs"]
mod tests;
