//! Forgot-password flow: issue, verify, and redeem short reset tokens.
//!
//! DESIGN
//! ======
//! Tokens are six characters drawn from the 62-symbol alphanumeric alphabet.
//! The store keeps only a SHA-256 digest per email, so a newer request
//! replaces the older token. Entries expire after the configured TTL and are
//! pruned whenever the store is touched.
//!
//! TRADE-OFFS
//! ==========
//! The store is process-local. A restart invalidates every outstanding token,
//! which only forces the user to request a new one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::mailer::{self, MailError, Mailer};
use super::session::{self, bytes_to_hex};
use super::user::{self, UserError};

const TOKEN_LEN: usize = 6;
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid or expired reset token")]
    InvalidToken,
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[must_use]
pub fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..TOKEN_ALPHABET.len());
            TOKEN_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    bytes_to_hex(&hasher.finalize())
}

// =============================================================================
// TOKEN STORE
// =============================================================================

struct ResetEntry {
    digest: String,
    issued_at: Instant,
}

/// Email → pending reset token. Clone shares the same underlying map.
#[derive(Clone)]
pub struct ResetTokenStore {
    inner: Arc<RwLock<HashMap<String, ResetEntry>>>,
    ttl: Duration,
}

impl ResetTokenStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate and store a fresh token for `email`, replacing any previous one.
    pub async fn issue(&self, email: &str) -> String {
        self.issue_at(email, Instant::now()).await
    }

    async fn issue_at(&self, email: &str, now: Instant) -> String {
        let token = generate_reset_token();
        let mut inner = self.inner.write().await;
        prune_expired(&mut inner, now, self.ttl);
        inner.insert(email.to_owned(), ResetEntry { digest: hash_reset_token(&token), issued_at: now });
        token
    }

    /// True when `token` is the live token for `email`.
    pub async fn verify(&self, email: &str, token: &str) -> bool {
        self.verify_at(email, token, Instant::now()).await
    }

    async fn verify_at(&self, email: &str, token: &str, now: Instant) -> bool {
        let inner = self.inner.read().await;
        inner
            .get(email)
            .is_some_and(|entry| !is_expired(entry, now, self.ttl) && entry.digest == hash_reset_token(token))
    }

    /// Remove the token for `email` if it matches. Returns whether it did.
    pub async fn consume(&self, email: &str, token: &str) -> bool {
        self.consume_at(email, token, Instant::now()).await
    }

    async fn consume_at(&self, email: &str, token: &str, now: Instant) -> bool {
        let mut inner = self.inner.write().await;
        prune_expired(&mut inner, now, self.ttl);
        let matches = inner
            .get(email)
            .is_some_and(|entry| entry.digest == hash_reset_token(token));
        if matches {
            inner.remove(email);
        }
        matches
    }

    /// Drop the pending token for `email` regardless of value.
    pub async fn revoke(&self, email: &str) {
        self.inner.write().await.remove(email);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn is_expired(entry: &ResetEntry, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(entry.issued_at) > ttl
}

fn prune_expired(map: &mut HashMap<String, ResetEntry>, now: Instant, ttl: Duration) {
    map.retain(|_, entry| !is_expired(entry, now, ttl));
}

// =============================================================================
// FLOW
// =============================================================================

/// Issue a reset token for an existing user and email it when a mailer is set.
///
/// # Errors
///
/// Returns [`ResetError::UserNotFound`] for unknown emails and
/// [`ResetError::Mail`] when delivery fails (the token is revoked).
pub async fn request_reset(
    pool: &PgPool,
    store: &ResetTokenStore,
    mailer: Option<&dyn Mailer>,
    email: &str,
) -> Result<String, ResetError> {
    let email = user::normalize_email(email).ok_or(ResetError::UserNotFound)?;
    if user::get_user(pool, &email).await?.is_none() {
        return Err(ResetError::UserNotFound);
    }

    let token = store.issue(&email).await;

    match mailer {
        Some(mailer) => {
            let ttl_minutes = store.ttl().as_secs().div_ceil(60);
            let message = mailer::password_reset_email(&email, &token, ttl_minutes);
            if let Err(e) = mailer.send(message).await {
                store.revoke(&email).await;
                return Err(e.into());
            }
            info!(%email, "password reset token emailed");
        }
        None => warn!(%email, "password reset token generated but no mailer is configured"),
    }

    Ok(token)
}

/// Check a token without consuming it.
pub async fn verify_reset(store: &ResetTokenStore, email: &str, token: &str) -> bool {
    let Some(email) = user::normalize_email(email) else {
        return false;
    };
    store.verify(&email, token).await
}

/// Redeem a token and set the new password. Existing sessions are dropped.
///
/// # Errors
///
/// Returns [`ResetError::InvalidToken`] for unknown, stale, or wrong tokens,
/// and a user error when the new password is rejected.
pub async fn reset_password(
    pool: &PgPool,
    store: &ResetTokenStore,
    email: &str,
    token: &str,
    new_password: &str,
) -> Result<(), ResetError> {
    let email = user::normalize_email(email).ok_or(ResetError::InvalidToken)?;
    user::validate_new_password(new_password)?;

    if !store.verify(&email, token).await {
        return Err(ResetError::InvalidToken);
    }

    // The token stays redeemable until the new password is stored.
    match user::set_password(pool, &email, new_password).await {
        Ok(_) => {}
        Err(UserError::NotFound(_)) => return Err(ResetError::UserNotFound),
        Err(e) => return Err(e.into()),
    }
    store.consume(&email, token).await;

    let dropped = session::delete_sessions_for_user(pool, &email).await?;
    info!(%email, dropped_sessions = dropped, "password reset completed");
    Ok(())
}

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod tests;
