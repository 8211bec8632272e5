//! Monthly budget service and spending statistics.
//!
//! DESIGN
//! ======
//! One budget row exists per `(user_email, month)`. Rows are created lazily
//! on first read with `INSERT .. ON CONFLICT DO NOTHING` followed by a
//! select, so two concurrent first reads converge on the same row.
//! `monthly_budget` is derived: it always mirrors `funds_amount`.
//!
//! The statistics are computed in Rust by [`compute_monthly_stats`], a pure
//! function over the month's expenses, so the arithmetic is testable without
//! a database.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::PgPool;

use super::expense::{self, Expense, ExpenseError};

const NO_CATEGORY: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Budget not found")]
    NotFound(i64),
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ExpenseError> for BudgetError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::Database(e) => Self::Database(e),
            ExpenseError::NotFound(id) => Self::NotFound(id),
            ExpenseError::NegativeAmount => Self::InvalidAmount("negative".into()),
            ExpenseError::AmountTooLarge => Self::InvalidAmount("too large".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(rename = "budgetID")]
    pub budget_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_budget: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub funds_amount: Decimal,
    pub month: String,
    pub user_email: String,
    pub update_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_budget: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub available_budget: Decimal,
    pub most_spent_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_daily_spent: Decimal,
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Parse `YYYY-MM` into the first and last day of that month.
///
/// # Errors
///
/// Returns [`BudgetError::InvalidMonth`] for anything else.
pub fn parse_month(month: &str) -> Result<(NaiveDate, NaiveDate), BudgetError> {
    let invalid = || BudgetError::InvalidMonth(month.to_owned());
    let (year, mon) = month.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || mon.len() != 2 || !year.bytes().chain(mon.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let mon: u32 = mon.parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((start, end))
}

/// Parse an `addFunds` amount.
///
/// # Errors
///
/// Returns [`BudgetError::InvalidAmount`] when the value is not a decimal or
/// does not fit a `NUMERIC(12,2)` column.
pub fn parse_amount(raw: &str) -> Result<Decimal, BudgetError> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|amount| expense::fits_amount_column(*amount))
        .ok_or_else(|| BudgetError::InvalidAmount(raw.to_owned()))
}

/// SQLSTATE 22003: the new total no longer fits the column.
fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == "22003")
}

/// Derive the month's statistics from its budget and expenses.
///
/// Ties on the most-spent category resolve to the lexicographically smallest
/// name. The daily average divides by the number of distinct purchase days
/// and rounds half-up to two places.
#[must_use]
pub fn compute_monthly_stats(monthly_budget: Decimal, expenses: &[Expense]) -> MonthlyStats {
    let total_spent: Decimal = expenses.iter().map(|e| e.amount).sum();

    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    for e in expenses {
        *by_category.entry(e.category.as_str()).or_default() += e.amount;
    }
    // BTreeMap iterates in key order; keeping the first maximum picks the
    // smallest name on ties.
    let most_spent_category = by_category
        .iter()
        .fold(None::<(&str, Decimal)>, |best, (&cat, &sum)| match best {
            Some((_, top)) if top >= sum => best,
            _ => Some((cat, sum)),
        })
        .map_or_else(|| NO_CATEGORY.to_owned(), |(cat, _)| cat.to_owned());

    let days: BTreeSet<NaiveDate> = expenses.iter().map(|e| e.purchase_date).collect();
    let avg_daily_spent = if days.is_empty() {
        Decimal::ZERO
    } else {
        (total_spent / Decimal::from(days.len())).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    MonthlyStats {
        monthly_budget,
        total_spent,
        available_budget: monthly_budget - total_spent,
        most_spent_category,
        avg_daily_spent,
    }
}

// =============================================================================
// QUERIES
// =============================================================================

const BUDGET_COLUMNS: &str = "budget_id, monthly_budget, funds_amount, month, user_email, update_date";

/// Fetch the budget for `(email, month)`, creating a zeroed one if absent.
///
/// # Errors
///
/// Returns [`BudgetError::InvalidMonth`] for a malformed month.
pub async fn get_or_create(pool: &PgPool, email: &str, month: &str) -> Result<Budget, BudgetError> {
    parse_month(month)?;
    let email = email.trim().to_ascii_lowercase();

    sqlx::query(
        r"INSERT INTO budgets (monthly_budget, funds_amount, month, user_email, update_date)
          VALUES (0, 0, $1, $2, $3)
          ON CONFLICT (user_email, month) DO NOTHING",
    )
    .bind(month)
    .bind(&email)
    .bind(today())
    .execute(pool)
    .await?;

    let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_email = $1 AND month = $2");
    let budget = sqlx::query_as::<_, Budget>(&sql)
        .bind(&email)
        .bind(month)
        .fetch_one(pool)
        .await?;
    Ok(budget)
}

/// Add `amount` to a budget's funds. `monthly_budget` follows the new total.
///
/// # Errors
///
/// Returns [`BudgetError::NotFound`] when no budget has this id and
/// [`BudgetError::InvalidAmount`] when the new total would overflow.
pub async fn add_funds(pool: &PgPool, id: i64, amount: Decimal) -> Result<Budget, BudgetError> {
    let sql = format!(
        "UPDATE budgets
         SET funds_amount = funds_amount + $2,
             monthly_budget = funds_amount + $2,
             update_date = $3
         WHERE budget_id = $1 RETURNING {BUDGET_COLUMNS}"
    );
    let budget = sqlx::query_as::<_, Budget>(&sql)
        .bind(id)
        .bind(amount)
        .bind(today())
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            if is_numeric_overflow(&e) {
                BudgetError::InvalidAmount(amount.to_string())
            } else {
                BudgetError::Database(e)
            }
        })?;
    budget.ok_or(BudgetError::NotFound(id))
}

/// Statistics for one user's month. Creates the budget row if needed.
///
/// # Errors
///
/// Returns [`BudgetError::InvalidMonth`] for a malformed month.
pub async fn monthly_stats(pool: &PgPool, email: &str, month: &str) -> Result<MonthlyStats, BudgetError> {
    let (start, end) = parse_month(month)?;
    let budget = get_or_create(pool, email, month).await?;
    let expenses = expense::list_expenses_between(pool, email, start, end).await?;
    Ok(compute_monthly_stats(budget.monthly_budget, &expenses))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
#[path = "budget_test.rs"]
mod tests;
