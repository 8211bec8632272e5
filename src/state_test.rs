use super::*;

#[tokio::test]
async fn new_state_uses_configured_reset_ttl() {
    let state = test_helpers::test_app_state();
    assert_eq!(state.reset_tokens.ttl(), state.config.reset_token_ttl);
    assert!(state.mailer.is_none());
}

#[tokio::test]
async fn clones_share_reset_tokens() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    let token = state.reset_tokens.issue("ada@example.com").await;
    assert!(clone.reset_tokens.verify("ada@example.com", &token).await);
}

#[tokio::test]
async fn mailer_can_be_installed() {
    let mailer = Arc::new(test_helpers::RecordingMailer::default());
    let state = test_helpers::test_app_state_with_mailer(mailer);
    assert!(state.mailer.is_some());
}
