//! Task routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::error_response;
use crate::services::task::{self, TaskError, TaskInput};
use crate::state::AppState;

pub(crate) fn task_error_to_status(err: &TaskError) -> StatusCode {
    match err {
        TaskError::MissingTitle => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn task_error(err: TaskError) -> Response {
    error_response(task_error_to_status(&err), err)
}

#[derive(Deserialize)]
pub struct TasksQuery {
    pub email: String,
}

/// `GET /tasks?email=`
pub async fn list_tasks(State(state): State<AppState>, Query(query): Query<TasksQuery>) -> Response {
    match task::list_tasks_for_user(&state.pool, &query.email).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => task_error(e),
    }
}

/// `POST /tasks`
pub async fn create_task(State(state): State<AppState>, Json(body): Json<TaskInput>) -> Response {
    match task::create_task(&state.pool, &body).await {
        Ok(created) => Json(created).into_response(),
        Err(e) => task_error(e),
    }
}

/// `PUT /tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TaskInput>,
) -> Response {
    match task::update_task(&state.pool, id, &body).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => task_error(e),
    }
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match task::delete_task(&state.pool, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => task_error(e),
    }
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
