//! Admin account routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::error_response;
use crate::services::admin::{self, AdminCredentials, AdminError};
use crate::state::AppState;

pub(crate) fn admin_error_to_status(err: &AdminError) -> StatusCode {
    match err {
        AdminError::InvalidEmail | AdminError::PasswordTooShort => StatusCode::BAD_REQUEST,
        AdminError::AlreadyExists(_) => StatusCode::CONFLICT,
        AdminError::NotFound(_) => StatusCode::NOT_FOUND,
        AdminError::Hash(_) | AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn admin_error(err: AdminError) -> Response {
    error_response(admin_error_to_status(&err), err)
}

/// `POST /api/admins`
pub async fn create_admin(State(state): State<AppState>, Json(body): Json<AdminCredentials>) -> Response {
    match admin::create_admin(&state.pool, &body).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => admin_error(e),
    }
}

/// `GET /api/admins`
pub async fn list_admins(State(state): State<AppState>) -> Response {
    match admin::list_admins(&state.pool).await {
        Ok(admins) => Json(admins).into_response(),
        Err(e) => admin_error(e),
    }
}

/// `GET /api/admins/{adminEmail}`
pub async fn get_admin(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    match admin::get_admin(&state.pool, &email).await {
        Ok(Some(found)) => Json(found).into_response(),
        Ok(None) => admin_error(AdminError::NotFound(email)),
        Err(e) => admin_error(e),
    }
}

#[derive(Deserialize)]
pub struct AdminPasswordBody {
    pub password: String,
}

/// `PUT /api/admins/{adminEmail}`: change password.
pub async fn update_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(body): Json<AdminPasswordBody>,
) -> Response {
    match admin::update_admin_password(&state.pool, &email, &body.password).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => admin_error(e),
    }
}

/// `DELETE /api/admins/{adminEmail}`
pub async fn delete_admin(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    match admin::delete_admin(&state.pool, &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => admin_error(e),
    }
}

/// `POST /api/admins/login`
pub async fn login(State(state): State<AppState>, Json(body): Json<AdminCredentials>) -> Response {
    match admin::authenticate(&state.pool, &body.admin_email, &body.password).await {
        Ok(Some(found)) => Json(found).into_response(),
        Ok(None) => (StatusCode::UNAUTHORIZED, "Invalid admin credentials").into_response(),
        Err(e) => admin_error(e),
    }
}

#[cfg(test)]
#[path = "admins_test.rs"]
mod tests;
