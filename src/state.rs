//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the loaded config, and the two pieces of
//! process-local mutable state: pending password-reset tokens and the
//! sliding-window rate limiter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::services::mailer::Mailer;
use crate::services::password_reset::ResetTokenStore;

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; every field is
/// either a handle (`PgPool`, `Arc`) or itself shares its inner map.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub reset_tokens: ResetTokenStore,
    pub rate_limiter: RateLimiter,
    /// Optional outbound mail. `None` if Resend env vars are not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig, mailer: Option<Arc<dyn Mailer>>) -> Self {
        let reset_tokens = ResetTokenStore::new(config.reset_token_ttl);
        Self { pool, config: Arc::new(config), reset_tokens, rate_limiter: RateLimiter::new(), mailer }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
