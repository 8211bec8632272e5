//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds every REST endpoint under a single Axum router. Handlers live in one
//! module per area and only translate HTTP to service calls; each module owns
//! a small `*_error_to_status` mapping for its service's error enum.
//!
//! The web client runs on a different origin and sends the session cookie, so
//! CORS lists explicit origins and allows credentials.

pub mod admins;
pub mod budgets;
pub mod contact;
pub mod expenses;
pub mod mood;
pub mod tasks;
pub mod users;

use std::fmt::Display;

use axum::Router;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        // Users and auth
        .route("/api/users", get(users::list_users))
        .route("/api/users/signup", post(users::signup))
        .route("/api/users/login", post(users::login))
        .route("/api/users/logout", post(users::logout))
        .route("/api/users/me", get(users::me))
        .route("/api/users/forgot-password", post(users::forgot_password))
        .route("/api/users/verify-reset-token", post(users::verify_reset_token))
        .route("/api/users/search/name/{name}", get(users::search_by_name))
        .route("/api/users/search/profession/{profession}", get(users::search_by_profession))
        .route("/api/users/search/age", get(users::search_by_age))
        .route("/api/users/search/gmail", get(users::search_gmail))
        .route(
            "/api/users/{email_id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/api/users/{email_id}/reset-normal", put(users::reset_normal))
        .route("/api/users/{email_id}/reset-password", post(users::reset_password))
        // Admins
        .route("/api/admins", get(admins::list_admins).post(admins::create_admin))
        .route("/api/admins/login", post(admins::login))
        .route(
            "/api/admins/{admin_email}",
            get(admins::get_admin).put(admins::update_admin).delete(admins::delete_admin),
        )
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/{id}", put(tasks::update_task).delete(tasks::delete_task))
        // Expenses
        .route("/api/expenses", get(expenses::list_expenses).post(expenses::create_expense))
        .route("/api/expenses/user/{email}", get(expenses::list_for_user))
        .route(
            "/api/expenses/{id}",
            get(expenses::get_expense).put(expenses::update_expense).delete(expenses::delete_expense),
        )
        // Budgets. The id route reuses the `{email}` segment name because the
        // router allows only one parameter name per position.
        .route("/api/budgets/{email}/{month}", get(budgets::get_budget))
        .route("/api/budgets/{email}/addFunds", put(budgets::add_funds))
        .route("/api/budgets/stats/{email}/{month}", get(budgets::monthly_stats))
        // Mood
        .route("/api/mood", get(mood::history).post(mood::save_mood))
        .route("/api/mood/day", get(mood::mood_for_day))
        // Contact inbox
        .route("/api/contact/submit", post(contact::submit))
        .route("/api/contact/messages", get(contact::list_messages))
        .route("/api/contact/messages/email/{email}", get(contact::messages_by_email))
        .route(
            "/api/contact/messages/{id}",
            get(contact::get_message).delete(contact::delete_message),
        )
        .route("/api/contact/messages/{id}/status", put(contact::update_status))
        .route("/api/contact/messages/{id}/read", put(contact::mark_read))
        .route("/api/contact/messages/{id}/responded", put(contact::mark_responded))
        .route("/api/contact/statistics", get(contact::statistics))
        .route("/api/contact/unread-count", get(contact::unread_count))
        .route("/api/contact/health", get(contact::health))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Plain-text error response. Server errors are logged and their detail is
/// withheld from the client.
pub(crate) fn error_response(status: StatusCode, err: impl Display) -> Response {
    if status.is_server_error() {
        tracing::error!(error = %err, %status, "request failed");
        return (status, status.canonical_reason().unwrap_or("Internal Server Error")).into_response();
    }
    (status, err.to_string()).into_response()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
