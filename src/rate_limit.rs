//! In-memory rate limiting for unauthenticated write endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! one map per [`Bucket`]:
//! - Contact form submissions, keyed by client IP: 5 per 10 minutes
//! - Password-reset token requests, keyed by email: 3 per 15 minutes
//!
//! TRADE-OFFS
//! ==========
//! Counters live in process memory, so limits reset on restart and are not
//! shared between replicas. Keys are pruned lazily when their window empties.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::env_parse;

const DEFAULT_CONTACT_LIMIT: usize = 5;
const DEFAULT_CONTACT_WINDOW_SECS: u64 = 600;

const DEFAULT_RESET_LIMIT: usize = 3;
const DEFAULT_RESET_WINDOW_SECS: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    ContactSubmit,
    PasswordReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub limit: usize,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub contact: WindowLimit,
    pub reset: WindowLimit,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            contact: WindowLimit {
                limit: env_parse("RATE_LIMIT_CONTACT", DEFAULT_CONTACT_LIMIT),
                window: Duration::from_secs(env_parse("RATE_LIMIT_CONTACT_WINDOW_SECS", DEFAULT_CONTACT_WINDOW_SECS)),
            },
            reset: WindowLimit {
                limit: env_parse("RATE_LIMIT_RESET", DEFAULT_RESET_LIMIT),
                window: Duration::from_secs(env_parse("RATE_LIMIT_RESET_WINDOW_SECS", DEFAULT_RESET_WINDOW_SECS)),
            },
        }
    }

    fn limit_for(&self, bucket: Bucket) -> WindowLimit {
        match bucket {
            Bucket::ContactSubmit => self.contact,
            Bucket::PasswordReset => self.reset,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            contact: WindowLimit {
                limit: DEFAULT_CONTACT_LIMIT,
                window: Duration::from_secs(DEFAULT_CONTACT_WINDOW_SECS),
            },
            reset: WindowLimit { limit: DEFAULT_RESET_LIMIT, window: Duration::from_secs(DEFAULT_RESET_WINDOW_SECS) },
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("rate limit exceeded (max {limit} requests/{window_secs}s)")]
pub struct RateLimitExceeded {
    pub limit: usize,
    pub window_secs: u64,
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<(Bucket, String), VecDeque<Instant>>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), config }
    }

    /// Check the bucket's limit for `key`, then record the request.
    pub fn check_and_record(&self, bucket: Bucket, key: &str) -> Result<(), RateLimitExceeded> {
        self.check_and_record_at(bucket, key, Instant::now())
    }

    fn check_and_record_at(&self, bucket: Bucket, key: &str, now: Instant) -> Result<(), RateLimitExceeded> {
        let cfg = self.config.limit_for(bucket);
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let deque = inner.entry((bucket, key.to_owned())).or_default();
        prune_window(deque, now, cfg.window);
        if deque.len() >= cfg.limit {
            return Err(RateLimitExceeded { limit: cfg.limit, window_secs: cfg.window.as_secs() });
        }
        deque.push_back(now);

        // Drop keys whose windows have fully drained.
        let config = self.config;
        inner.retain(|(b, _), d| {
            prune_window(d, now, config.limit_for(*b).window);
            !d.is_empty()
        });
        Ok(())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
