use super::*;
use crate::state::test_helpers::{call, empty_request, json_request, test_app_state};
use serde_json::json;

#[test]
fn task_error_to_status_mapping() {
    assert_eq!(task_error_to_status(&TaskError::MissingTitle), StatusCode::BAD_REQUEST);
    assert_eq!(task_error_to_status(&TaskError::NotFound(3)), StatusCode::NOT_FOUND);
    assert_eq!(
        task_error_to_status(&TaskError::Database(sqlx::Error::PoolClosed)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn create_task_with_blank_title_is_bad_request() {
    let (status, _, body) = call(
        test_app_state(),
        json_request("POST", "/tasks", &json!({"title": " ", "userEmail": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "task title is required");
}

#[tokio::test]
async fn update_task_with_blank_title_is_bad_request() {
    let (status, _, _) = call(
        test_app_state(),
        json_request("PUT", "/tasks/1", &json!({"title": "", "userEmail": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_tasks_requires_email_query() {
    let (status, _, _) = call(test_app_state(), empty_request("GET", "/tasks")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_task_id_is_rejected() {
    let (status, _, _) = call(test_app_state(), empty_request("DELETE", "/tasks/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
