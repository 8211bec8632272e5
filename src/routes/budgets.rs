//! Budget routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::error_response;
use crate::services::budget::{self, BudgetError};
use crate::state::AppState;

pub(crate) fn budget_error_to_status(err: &BudgetError) -> StatusCode {
    match err {
        BudgetError::InvalidMonth(_) | BudgetError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        BudgetError::NotFound(_) => StatusCode::NOT_FOUND,
        BudgetError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn budget_error(err: BudgetError) -> Response {
    error_response(budget_error_to_status(&err), err)
}

/// `GET /api/budgets/{email}/{month}`: get or create.
pub async fn get_budget(State(state): State<AppState>, Path((email, month)): Path<(String, String)>) -> Response {
    match budget::get_or_create(&state.pool, &email, &month).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => budget_error(e),
    }
}

#[derive(Deserialize)]
pub struct AddFundsQuery {
    pub amount: String,
}

/// `PUT /api/budgets/{id}/addFunds?amount=`
pub async fn add_funds(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AddFundsQuery>,
) -> Response {
    let amount = match budget::parse_amount(&query.amount) {
        Ok(a) => a,
        Err(e) => return budget_error(e),
    };
    match budget::add_funds(&state.pool, id, amount).await {
        Ok(updated) => {
            tracing::info!(budget_id = id, %amount, "budget funds added");
            Json(updated).into_response()
        }
        Err(e) => budget_error(e),
    }
}

/// `GET /api/budgets/stats/{email}/{month}`
pub async fn monthly_stats(State(state): State<AppState>, Path((email, month)): Path<(String, String)>) -> Response {
    match budget::monthly_stats(&state.pool, &email, &month).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => budget_error(e),
    }
}

#[cfg(test)]
#[path = "budgets_test.rs"]
mod tests;
