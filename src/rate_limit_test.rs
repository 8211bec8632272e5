use super::*;

fn tight_config() -> RateLimitConfig {
    RateLimitConfig {
        contact: WindowLimit { limit: 2, window: Duration::from_secs(60) },
        reset: WindowLimit { limit: 1, window: Duration::from_secs(30) },
    }
}

#[test]
fn allows_up_to_limit_then_rejects() {
    let rl = RateLimiter::with_config(tight_config());
    let now = Instant::now();

    assert!(rl.check_and_record_at(Bucket::ContactSubmit, "10.0.0.1", now).is_ok());
    assert!(rl.check_and_record_at(Bucket::ContactSubmit, "10.0.0.1", now).is_ok());
    assert_eq!(
        rl.check_and_record_at(Bucket::ContactSubmit, "10.0.0.1", now),
        Err(RateLimitExceeded { limit: 2, window_secs: 60 })
    );
}

#[test]
fn keys_are_independent() {
    let rl = RateLimiter::with_config(tight_config());
    let now = Instant::now();

    assert!(rl.check_and_record_at(Bucket::PasswordReset, "a@example.com", now).is_ok());
    assert!(rl.check_and_record_at(Bucket::PasswordReset, "b@example.com", now).is_ok());
    assert!(rl.check_and_record_at(Bucket::PasswordReset, "a@example.com", now).is_err());
}

#[test]
fn buckets_are_independent() {
    let rl = RateLimiter::with_config(tight_config());
    let now = Instant::now();

    assert!(rl.check_and_record_at(Bucket::PasswordReset, "shared", now).is_ok());
    assert!(rl.check_and_record_at(Bucket::ContactSubmit, "shared", now).is_ok());
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = RateLimiter::with_config(tight_config());
    let start = Instant::now();

    assert!(rl.check_and_record_at(Bucket::PasswordReset, "a@example.com", start).is_ok());
    assert!(rl.check_and_record_at(Bucket::PasswordReset, "a@example.com", start).is_err());

    let later = start + Duration::from_secs(31);
    assert!(rl.check_and_record_at(Bucket::PasswordReset, "a@example.com", later).is_ok());
}

#[test]
fn drained_keys_are_pruned() {
    let rl = RateLimiter::with_config(tight_config());
    let start = Instant::now();

    rl.check_and_record_at(Bucket::PasswordReset, "old@example.com", start)
        .unwrap();
    assert_eq!(rl.tracked_keys(), 1);

    let later = start + Duration::from_secs(31);
    rl.check_and_record_at(Bucket::PasswordReset, "new@example.com", later)
        .unwrap();
    assert_eq!(rl.tracked_keys(), 1);
}

#[test]
fn default_config_matches_constants() {
    let cfg = RateLimitConfig::default();
    assert_eq!(cfg.contact.limit, DEFAULT_CONTACT_LIMIT);
    assert_eq!(cfg.contact.window, Duration::from_secs(DEFAULT_CONTACT_WINDOW_SECS));
    assert_eq!(cfg.reset.limit, DEFAULT_RESET_LIMIT);
    assert_eq!(cfg.reset.window, Duration::from_secs(DEFAULT_RESET_WINDOW_SECS));
}
