use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// Live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn session_lifecycle_round_trip() {
    use crate::services::user::{SignupRequest, create_user};
    use crate::state::test_helpers;

    let pool = test_helpers::integration_pool().await;
    create_user(
        &pool,
        SignupRequest {
            email_id: "session@example.com".into(),
            name: "Session User".into(),
            age: 30,
            gender: "other".into(),
            profession: "Tester".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        },
    )
    .await
    .expect("signup should succeed");

    let token = create_session(&pool, "session@example.com").await.unwrap();
    let user = validate_session(&pool, &token).await.unwrap();
    assert_eq!(user.map(|u| u.email_id).as_deref(), Some("session@example.com"));

    delete_session(&pool, &token).await.unwrap();
    assert!(validate_session(&pool, &token).await.unwrap().is_none());

    create_session(&pool, "session@example.com").await.unwrap();
    create_session(&pool, "session@example.com").await.unwrap();
    assert_eq!(delete_sessions_for_user(&pool, "session@example.com").await.unwrap(), 2);
}
