use super::*;
use crate::state::test_helpers;
use std::str::FromStr;

fn parse(body: &str) -> ExpenseInput {
    serde_json::from_str(body).expect("expense payload should parse")
}

#[test]
fn input_ignores_client_supplied_id() {
    let input = parse(
        r#"{"expenseId":99,"description":"Lunch","purchaseDate":"2025-02-03",
            "amount":12.5,"category":"Food","userEmail":"ada@example.com"}"#,
    );
    assert_eq!(input.amount, Decimal::from_str("12.5").unwrap());
    assert_eq!(input.purchase_date, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
}

#[test]
fn validate_rejects_negative_amount() {
    let input = parse(r#"{"purchaseDate":"2025-02-03","amount":-1,"category":"Food","userEmail":"a@b.c"}"#);
    assert!(matches!(input.validate(), Err(ExpenseError::NegativeAmount)));
}

#[test]
fn validate_accepts_zero_amount() {
    let input = parse(r#"{"purchaseDate":"2025-02-03","amount":0,"category":"Food","userEmail":"a@b.c"}"#);
    assert!(input.validate().is_ok());
}

#[test]
fn amount_column_bounds() {
    assert!(fits_amount_column(Decimal::from_str("9999999999.99").unwrap()));
    assert!(fits_amount_column(Decimal::from_str("-9999999999.99").unwrap()));
    assert!(fits_amount_column(Decimal::from_str("12.345").unwrap()));
    assert!(!fits_amount_column(Decimal::from_str("10000000000").unwrap()));
    assert!(!fits_amount_column(Decimal::from_str("9999999999.999").unwrap()));
}

#[test]
fn validate_rejects_amount_beyond_column() {
    let input = parse(r#"{"purchaseDate":"2025-02-03","amount":1e11,"category":"Food","userEmail":"a@b.c"}"#);
    assert!(matches!(input.validate(), Err(ExpenseError::AmountTooLarge)));
}

#[test]
fn expense_serializes_amount_as_number() {
    let expense = Expense {
        expense_id: 3,
        description: "Bus".into(),
        purchase_date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        amount: Decimal::from_str("2.75").unwrap(),
        category: "Transport".into(),
        user_email: "ada@example.com".into(),
    };
    let json = serde_json::to_value(&expense).unwrap();
    assert_eq!(json["expenseId"], 3);
    assert_eq!(json["purchaseDate"], "2025-02-03");
    assert!(json["amount"].is_number());
    assert!((json["amount"].as_f64().unwrap() - 2.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn create_expense_rejects_negative_before_database() {
    let state = test_helpers::test_app_state();
    let input = parse(r#"{"purchaseDate":"2025-02-03","amount":-0.01,"category":"Food","userEmail":"a@b.c"}"#);
    assert!(matches!(
        create_expense(&state.pool, &input).await,
        Err(ExpenseError::NegativeAmount)
    ));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn expense_crud_and_range_query() {
    let pool = test_helpers::integration_pool().await;

    let jan = create_expense(
        &pool,
        &parse(r#"{"purchaseDate":"2025-01-31","amount":10,"category":"Food","userEmail":"ada@example.com"}"#),
    )
    .await
    .unwrap();
    let feb = create_expense(
        &pool,
        &parse(r#"{"purchaseDate":"2025-02-01","amount":20,"category":"Food","userEmail":"ada@example.com"}"#),
    )
    .await
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
    let in_feb = list_expenses_between(&pool, "ada@example.com", start, end).await.unwrap();
    assert_eq!(in_feb, vec![feb.clone()]);

    let updated = update_expense(
        &pool,
        jan.expense_id,
        &parse(r#"{"purchaseDate":"2025-02-28","amount":11,"category":"Fun","userEmail":"ada@example.com"}"#),
    )
    .await
    .unwrap();
    assert_eq!(updated.category, "Fun");
    assert_eq!(list_expenses_between(&pool, "ada@example.com", start, end).await.unwrap().len(), 2);

    delete_expense(&pool, feb.expense_id).await.unwrap();
    assert!(get_expense(&pool, feb.expense_id).await.unwrap().is_none());
    assert!(matches!(
        delete_expense(&pool, feb.expense_id).await,
        Err(ExpenseError::NotFound(_))
    ));
    assert_eq!(list_expenses_for_user(&pool, "ADA@example.com").await.unwrap().len(), 1);
}
