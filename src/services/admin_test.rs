use super::*;
use crate::state::test_helpers;

#[test]
fn check_password_enforces_minimum() {
    assert!(matches!(check_password("short"), Err(AdminError::PasswordTooShort)));
    assert!(check_password("longenough").is_ok());
}

#[test]
fn admin_serializes_camel_case() {
    let admin = Admin { admin_email: "root@tasknest.com".into() };
    let json = serde_json::to_value(&admin).unwrap();
    assert_eq!(json, serde_json::json!({"adminEmail": "root@tasknest.com"}));
}

#[test]
fn credentials_deserialize_from_client_payload() {
    let creds: AdminCredentials =
        serde_json::from_str(r#"{"adminEmail":"root@tasknest.com","password":"admin@123"}"#).unwrap();
    assert_eq!(creds.admin_email, "root@tasknest.com");
    assert_eq!(creds.password, "admin@123");
}

#[tokio::test]
async fn create_admin_rejects_bad_input_before_database() {
    let state = test_helpers::test_app_state();

    let bad_email = AdminCredentials { admin_email: "root".into(), password: "admin@123".into() };
    assert!(matches!(create_admin(&state.pool, &bad_email).await, Err(AdminError::InvalidEmail)));

    let short = AdminCredentials { admin_email: "root@tasknest.com".into(), password: "abc".into() };
    assert!(matches!(create_admin(&state.pool, &short).await, Err(AdminError::PasswordTooShort)));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn admin_crud_and_seed_round_trip() {
    let pool = test_helpers::integration_pool().await;
    let seed = AdminSeed { email: "Root@TaskNest.com".into(), password: "admin@123".into() };

    assert!(seed_admin(&pool, &seed).await.unwrap());
    assert!(!seed_admin(&pool, &seed).await.unwrap());

    assert!(
        authenticate(&pool, "root@tasknest.com", "admin@123")
            .await
            .unwrap()
            .is_some()
    );
    update_admin_password(&pool, "root@tasknest.com", "rotated1")
        .await
        .unwrap();
    assert!(
        authenticate(&pool, "root@tasknest.com", "admin@123")
            .await
            .unwrap()
            .is_none()
    );

    assert_eq!(list_admins(&pool).await.unwrap().len(), 1);
    delete_admin(&pool, "root@tasknest.com").await.unwrap();
    assert!(get_admin(&pool, "root@tasknest.com").await.unwrap().is_none());
    assert!(matches!(
        delete_admin(&pool, "root@tasknest.com").await,
        Err(AdminError::NotFound(_))
    ));
}
