//! Expense ledger service.
//!
//! Amounts are stored as `NUMERIC(12,2)` and carried as [`Decimal`] end to
//! end. The JSON form is a plain number, matching what the web client posts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("Expense not found with id {0}")]
    NotFound(i64),
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount must be at most 9999999999.99")]
    AmountTooLarge,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub expense_id: i64,
    pub description: String,
    pub purchase_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub user_email: String,
}

/// Create/replace payload. A client-supplied `expenseId` is accepted and
/// ignored; ids are always assigned by the database.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[serde(default)]
    pub description: String,
    pub purchase_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub user_email: String,
}

impl ExpenseInput {
    fn validate(&self) -> Result<(), ExpenseError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ExpenseError::NegativeAmount);
        }
        if !fits_amount_column(self.amount) {
            return Err(ExpenseError::AmountTooLarge);
        }
        Ok(())
    }
}

/// True when `amount`, rounded to cents, fits a `NUMERIC(12,2)` column.
#[must_use]
pub fn fits_amount_column(amount: Decimal) -> bool {
    amount.round_dp(2).abs() <= Decimal::new(999_999_999_999, 2)
}

const EXPENSE_COLUMNS: &str = "expense_id, description, purchase_date, amount, category, user_email";

/// Record a new expense.
///
/// # Errors
///
/// Returns [`ExpenseError::NegativeAmount`] for amounts below zero and
/// [`ExpenseError::AmountTooLarge`] for amounts the column cannot hold.
pub async fn create_expense(pool: &PgPool, input: &ExpenseInput) -> Result<Expense, ExpenseError> {
    input.validate()?;
    let sql = format!(
        "INSERT INTO expenses (description, purchase_date, amount, category, user_email)
         VALUES ($1, $2, $3, $4, $5) RETURNING {EXPENSE_COLUMNS}"
    );
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(&input.description)
        .bind(input.purchase_date)
        .bind(input.amount)
        .bind(input.category.trim())
        .bind(input.user_email.trim().to_ascii_lowercase())
        .fetch_one(pool)
        .await?;
    Ok(expense)
}

/// Every expense, ordered by id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_expenses(pool: &PgPool) -> Result<Vec<Expense>, ExpenseError> {
    let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY expense_id");
    let expenses = sqlx::query_as::<_, Expense>(&sql).fetch_all(pool).await?;
    Ok(expenses)
}

/// One expense by id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_expense(pool: &PgPool, id: i64) -> Result<Option<Expense>, ExpenseError> {
    let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE expense_id = $1");
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(expense)
}

/// Expenses recorded by one user.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_expenses_for_user(pool: &PgPool, email: &str) -> Result<Vec<Expense>, ExpenseError> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_email = $1
         ORDER BY purchase_date, expense_id"
    );
    let expenses = sqlx::query_as::<_, Expense>(&sql)
        .bind(email.trim().to_ascii_lowercase())
        .fetch_all(pool)
        .await?;
    Ok(expenses)
}

/// Expenses for one user with `start <= purchase_date <= end`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_expenses_between(
    pool: &PgPool,
    email: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Expense>, ExpenseError> {
    let sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE user_email = $1 AND purchase_date BETWEEN $2 AND $3
         ORDER BY purchase_date, expense_id"
    );
    let expenses = sqlx::query_as::<_, Expense>(&sql)
        .bind(email.trim().to_ascii_lowercase())
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
    Ok(expenses)
}

/// Replace every editable field of an expense.
///
/// # Errors
///
/// Returns [`ExpenseError::NotFound`] when no expense has this id.
pub async fn update_expense(pool: &PgPool, id: i64, input: &ExpenseInput) -> Result<Expense, ExpenseError> {
    input.validate()?;
    let sql = format!(
        "UPDATE expenses
         SET description = $2, purchase_date = $3, amount = $4, category = $5, user_email = $6
         WHERE expense_id = $1 RETURNING {EXPENSE_COLUMNS}"
    );
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(id)
        .bind(&input.description)
        .bind(input.purchase_date)
        .bind(input.amount)
        .bind(input.category.trim())
        .bind(input.user_email.trim().to_ascii_lowercase())
        .fetch_optional(pool)
        .await?;
    expense.ok_or(ExpenseError::NotFound(id))
}

/// Delete an expense.
///
/// # Errors
///
/// Returns [`ExpenseError::NotFound`] when no expense has this id.
pub async fn delete_expense(pool: &PgPool, id: i64) -> Result<(), ExpenseError> {
    let result = sqlx::query("DELETE FROM expenses WHERE expense_id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ExpenseError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "expense_test.rs"]
mod tests;
