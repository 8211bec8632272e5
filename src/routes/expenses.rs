//! Expense routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use super::error_response;
use crate::services::expense::{self, ExpenseError, ExpenseInput};
use crate::state::AppState;

pub(crate) fn expense_error_to_status(err: &ExpenseError) -> StatusCode {
    match err {
        ExpenseError::NegativeAmount | ExpenseError::AmountTooLarge => StatusCode::BAD_REQUEST,
        ExpenseError::NotFound(_) => StatusCode::NOT_FOUND,
        ExpenseError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn expense_error(err: ExpenseError) -> Response {
    error_response(expense_error_to_status(&err), err)
}

/// `POST /api/expenses`
pub async fn create_expense(State(state): State<AppState>, Json(body): Json<ExpenseInput>) -> Response {
    match expense::create_expense(&state.pool, &body).await {
        Ok(created) => Json(created).into_response(),
        Err(e) => expense_error(e),
    }
}

/// `GET /api/expenses`
pub async fn list_expenses(State(state): State<AppState>) -> Response {
    match expense::list_expenses(&state.pool).await {
        Ok(expenses) => Json(expenses).into_response(),
        Err(e) => expense_error(e),
    }
}

/// `GET /api/expenses/{id}`
pub async fn get_expense(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match expense::get_expense(&state.pool, id).await {
        Ok(Some(found)) => Json(found).into_response(),
        Ok(None) => expense_error(ExpenseError::NotFound(id)),
        Err(e) => expense_error(e),
    }
}

/// `GET /api/expenses/user/{email}`
pub async fn list_for_user(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    match expense::list_expenses_for_user(&state.pool, &email).await {
        Ok(expenses) => Json(expenses).into_response(),
        Err(e) => expense_error(e),
    }
}

/// `PUT /api/expenses/{id}`
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ExpenseInput>,
) -> Response {
    match expense::update_expense(&state.pool, id, &body).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => expense_error(e),
    }
}

/// `DELETE /api/expenses/{id}`
pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match expense::delete_expense(&state.pool, id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => expense_error(e),
    }
}

#[cfg(test)]
#[path = "expenses_test.rs"]
mod tests;
