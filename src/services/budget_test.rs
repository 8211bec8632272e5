use super::*;
use crate::state::test_helpers;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
}

fn expense(id: i64, date: NaiveDate, amount: &str, category: &str) -> Expense {
    Expense {
        expense_id: id,
        description: String::new(),
        purchase_date: date,
        amount: dec(amount),
        category: category.into(),
        user_email: "ada@example.com".into(),
    }
}

// =============================================================================
// parse_month
// =============================================================================

#[test]
fn parse_month_leap_february() {
    let (start, end) = parse_month("2024-02").unwrap();
    assert_eq!(start, day(1));
    assert_eq!(end, day(29));
}

#[test]
fn parse_month_december_rolls_year() {
    let (start, end) = parse_month("2023-12").unwrap();
    assert_eq!(start, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
}

#[test]
fn parse_month_rejects_malformed() {
    for bad in ["2024-13", "2024-2x", "2024-2", "24-02", "2024/02", "", "2024-00", "+024-02"] {
        assert!(matches!(parse_month(bad), Err(BudgetError::InvalidMonth(_))), "{bad} should be rejected");
    }
}

#[test]
fn parse_amount_accepts_decimals_and_rejects_text() {
    assert_eq!(parse_amount(" 150.25 ").unwrap(), dec("150.25"));
    assert!(matches!(parse_amount("lots"), Err(BudgetError::InvalidAmount(_))));
}

#[test]
fn parse_amount_rejects_values_beyond_column() {
    assert_eq!(parse_amount("9999999999.99").unwrap(), dec("9999999999.99"));
    assert!(matches!(parse_amount("10000000000"), Err(BudgetError::InvalidAmount(_))));
    assert!(matches!(parse_amount("-20000000000.5"), Err(BudgetError::InvalidAmount(_))));
}

// =============================================================================
// compute_monthly_stats
// =============================================================================

#[test]
fn stats_for_empty_month() {
    let stats = compute_monthly_stats(dec("500"), &[]);
    assert_eq!(stats.total_spent, Decimal::ZERO);
    assert_eq!(stats.available_budget, dec("500"));
    assert_eq!(stats.most_spent_category, "N/A");
    assert_eq!(stats.avg_daily_spent, Decimal::ZERO);
}

#[test]
fn stats_sum_and_available() {
    let expenses = [
        expense(1, day(1), "10.00", "Food"),
        expense(2, day(1), "5.50", "Transport"),
        expense(3, day(3), "20.00", "Food"),
    ];
    let stats = compute_monthly_stats(dec("100"), &expenses);
    assert_eq!(stats.total_spent, dec("35.50"));
    assert_eq!(stats.available_budget, dec("64.50"));
    assert_eq!(stats.most_spent_category, "Food");
}

#[test]
fn stats_average_uses_distinct_days() {
    let expenses = [
        expense(1, day(1), "10", "Food"),
        expense(2, day(1), "10", "Food"),
        expense(3, day(2), "10", "Food"),
    ];
    let stats = compute_monthly_stats(Decimal::ZERO, &expenses);
    // 30 over 2 distinct days.
    assert_eq!(stats.avg_daily_spent, dec("15.00"));
}

#[test]
fn stats_average_rounds_half_up() {
    // 0.125 / 1 day rounds to 0.13; 10 / 3 days rounds to 3.33.
    let one = compute_monthly_stats(Decimal::ZERO, &[expense(1, day(1), "0.125", "Misc")]);
    assert_eq!(one.avg_daily_spent, dec("0.13"));

    let three = compute_monthly_stats(
        Decimal::ZERO,
        &[
            expense(1, day(1), "3", "Misc"),
            expense(2, day(2), "3", "Misc"),
            expense(3, day(3), "4", "Misc"),
        ],
    );
    assert_eq!(three.avg_daily_spent, dec("3.33"));
}

#[test]
fn stats_tie_breaks_on_smallest_category() {
    let expenses = [
        expense(1, day(1), "25", "Travel"),
        expense(2, day(2), "25", "Books"),
        expense(3, day(3), "10", "Coffee"),
    ];
    let stats = compute_monthly_stats(Decimal::ZERO, &expenses);
    assert_eq!(stats.most_spent_category, "Books");
}

#[test]
fn stats_overspend_goes_negative() {
    let stats = compute_monthly_stats(dec("10"), &[expense(1, day(1), "12.5", "Food")]);
    assert_eq!(stats.available_budget, dec("-2.5"));
}

#[test]
fn stats_serialize_camel_case() {
    let stats = compute_monthly_stats(dec("100"), &[expense(1, day(1), "40", "Food")]);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["mostSpentCategory"], "Food");
    assert!(json["monthlyBudget"].is_number());
    assert!(json["availableBudget"].is_number());
    assert!(json["avgDailySpent"].is_number());
}

#[test]
fn budget_serializes_budget_id_key() {
    let budget = Budget {
        budget_id: 4,
        monthly_budget: dec("50"),
        funds_amount: dec("50"),
        month: "2024-02".into(),
        user_email: "ada@example.com".into(),
        update_date: day(10),
    };
    let json = serde_json::to_value(&budget).unwrap();
    assert_eq!(json["budgetID"], 4);
    assert_eq!(json["updateDate"], "2024-02-10");
    assert_eq!(json["userEmail"], "ada@example.com");
}

#[tokio::test]
async fn get_or_create_rejects_bad_month_before_database() {
    let state = test_helpers::test_app_state();
    assert!(matches!(
        get_or_create(&state.pool, "ada@example.com", "2024-13").await,
        Err(BudgetError::InvalidMonth(_))
    ));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn budget_lifecycle_and_stats() {
    use crate::services::expense::{ExpenseInput, create_expense};

    let pool = test_helpers::integration_pool().await;

    let first = get_or_create(&pool, "ada@example.com", "2024-02").await.unwrap();
    let again = get_or_create(&pool, "ada@example.com", "2024-02").await.unwrap();
    assert_eq!(first.budget_id, again.budget_id);
    assert_eq!(first.funds_amount, Decimal::ZERO);

    let funded = add_funds(&pool, first.budget_id, dec("100")).await.unwrap();
    let funded = add_funds(&pool, funded.budget_id, dec("50")).await.unwrap();
    assert_eq!(funded.funds_amount, dec("150"));
    assert_eq!(funded.monthly_budget, funded.funds_amount);

    for (date, amount, category) in [("2024-02-01", 20, "Food"), ("2024-02-02", 30, "Rent"), ("2024-03-01", 99, "Rent")] {
        let input: ExpenseInput = serde_json::from_value(serde_json::json!({
            "purchaseDate": date, "amount": amount, "category": category, "userEmail": "ada@example.com"
        }))
        .unwrap();
        create_expense(&pool, &input).await.unwrap();
    }

    let stats = monthly_stats(&pool, "ada@example.com", "2024-02").await.unwrap();
    assert_eq!(stats.total_spent, dec("50"));
    assert_eq!(stats.available_budget, dec("100"));
    assert_eq!(stats.most_spent_category, "Rent");
    assert_eq!(stats.avg_daily_spent, dec("25"));

    assert!(matches!(add_funds(&pool, 9999, dec("1")).await, Err(BudgetError::NotFound(9999))));
}
