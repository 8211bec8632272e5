use super::*;
use crate::state::test_helpers;

fn signup(email: &str, password: &str, confirm: &str) -> SignupRequest {
    SignupRequest {
        email_id: email.to_owned(),
        name: "Ada Lovelace".to_owned(),
        age: 36,
        gender: "female".to_owned(),
        profession: "Engineer".to_owned(),
        password: password.to_owned(),
        confirm_password: confirm.to_owned(),
    }
}

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  Ada@Example.COM "), Some("ada@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("ada"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("ada@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

// =============================================================================
// validate_new_password
// =============================================================================

#[test]
fn validate_new_password_enforces_minimum() {
    assert!(matches!(validate_new_password("12345"), Err(UserError::PasswordTooShort)));
    assert!(validate_new_password("123456").is_ok());
}

#[test]
fn validate_new_password_counts_chars_not_bytes() {
    // Five multi-byte characters are still too short.
    assert!(matches!(validate_new_password("ééééé"), Err(UserError::PasswordTooShort)));
}

#[test]
fn error_messages_match_client_expectations() {
    assert_eq!(UserError::PasswordMismatch.to_string(), "Password and Confirm Password do not match!");
    assert_eq!(UserError::PasswordTooShort.to_string(), "Password must be at least 6 characters");
    assert_eq!(UserError::NotFound("x@example.com".into()).to_string(), "User not found");
}

#[test]
fn user_serializes_camel_case_without_password() {
    let user = User {
        email_id: "ada@example.com".into(),
        name: "Ada".into(),
        age: 36,
        gender: "female".into(),
        profession: "Engineer".into(),
    };
    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["emailId"], "ada@example.com");
    assert_eq!(json["name"], "Ada");
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
}

#[test]
fn signup_request_accepts_client_payload() {
    let body = r#"{"emailId":"ada@example.com","name":"Ada","age":36,"gender":"female",
        "profession":"Engineer","password":"secret1","confirmPassword":"secret1"}"#;
    let req: SignupRequest = serde_json::from_str(body).unwrap();
    assert_eq!(req.email_id, "ada@example.com");
    assert_eq!(req.confirm_password, "secret1");
}

// =============================================================================
// Validation short-circuits before any database access (lazy pool).
// =============================================================================

#[tokio::test]
async fn create_user_rejects_mismatched_passwords() {
    let state = test_helpers::test_app_state();
    let result = create_user(&state.pool, signup("ada@example.com", "secret1", "secret2")).await;
    assert!(matches!(result, Err(UserError::PasswordMismatch)));
}

#[tokio::test]
async fn create_user_rejects_invalid_email() {
    let state = test_helpers::test_app_state();
    let result = create_user(&state.pool, signup("not-an-email", "secret1", "secret1")).await;
    assert!(matches!(result, Err(UserError::InvalidEmail)));
}

#[tokio::test]
async fn find_by_age_range_rejects_inverted_bounds() {
    let state = test_helpers::test_app_state();
    let result = find_by_age_range(&state.pool, 40, 20).await;
    assert!(matches!(result, Err(UserError::InvalidAgeRange { min: 40, max: 20 })));
}

#[tokio::test]
async fn set_password_rejects_short_password() {
    let state = test_helpers::test_app_state();
    let result = set_password(&state.pool, "ada@example.com", "abc").await;
    assert!(matches!(result, Err(UserError::PasswordTooShort)));
}

#[tokio::test]
async fn update_user_rejects_short_replacement_password() {
    let state = test_helpers::test_app_state();
    let req = UpdateUserRequest {
        name: "Ada".into(),
        age: 36,
        gender: "female".into(),
        profession: "Engineer".into(),
        password: Some("abc".into()),
    };
    let result = update_user(&state.pool, "ada@example.com", req).await;
    assert!(matches!(result, Err(UserError::PasswordTooShort)));
}

// =============================================================================
// Live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn user_crud_search_and_login_round_trip() {
    let pool = test_helpers::integration_pool().await;

    let created = create_user(&pool, signup(" Ada@Gmail.com ", "secret1", "secret1"))
        .await
        .expect("signup should succeed");
    assert_eq!(created.email_id, "ada@gmail.com");

    let dup = create_user(&pool, signup("ada@gmail.com", "secret1", "secret1")).await;
    assert!(matches!(dup, Err(UserError::AlreadyExists(_))));

    assert!(
        authenticate(&pool, "ADA@gmail.com", "secret1")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        authenticate(&pool, "ada@gmail.com", "wrong-pass")
            .await
            .unwrap()
            .is_none()
    );

    let by_profession = find_by_profession(&pool, "engineer").await.unwrap();
    assert_eq!(by_profession.len(), 1);
    let gmail = find_gmail_users(&pool).await.unwrap();
    assert_eq!(gmail.len(), 1);
    let in_range = find_by_age_range(&pool, 30, 40).await.unwrap();
    assert_eq!(in_range.len(), 1);

    let updated = update_user(
        &pool,
        "ada@gmail.com",
        UpdateUserRequest {
            name: "Ada King".into(),
            age: 37,
            gender: "female".into(),
            profession: "Mathematician".into(),
            password: Some("newsecret".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Ada King");
    assert!(
        authenticate(&pool, "ada@gmail.com", "newsecret")
            .await
            .unwrap()
            .is_some()
    );

    delete_user(&pool, "ada@gmail.com").await.unwrap();
    assert!(matches!(
        delete_user(&pool, "ada@gmail.com").await,
        Err(UserError::NotFound(_))
    ));
}
