//! Contact-form inbox service.
//!
//! DESIGN
//! ======
//! Submissions are validated here so the route layer can turn any
//! [`ContactError::Validation`] into a 400 with the reason attached. The
//! client address is resolved from proxy headers by [`client_ip`], falling
//! back to the socket peer.
//!
//! Read/responded flags are only ever set through [`update_status`], which
//! leaves a flag untouched when its argument is `None`.

use std::net::SocketAddr;
use std::sync::LazyLock;

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

pub const MAX_MESSAGE_CHARS: usize = 5000;
const RECENT_DAYS: i64 = 7;

/// Headers consulted for the client address, in order.
const IP_HEADERS: [&str; 5] =
    ["x-forwarded-for", "proxy-client-ip", "wl-proxy-client-ip", "http_client_ip", "http_x_forwarded_for"];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("Invalid regex"));

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Contact message not found with id: {0}")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "read")]
    #[sqlx(rename = "is_read")]
    pub read: bool,
    #[serde(rename = "responded")]
    #[sqlx(rename = "is_responded")]
    pub responded: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Form payload. Fields are optional so a missing one is reported with the
/// same message as a blank one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Request metadata recorded alongside a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStatistics {
    pub total_messages: i64,
    pub unread_messages: i64,
    pub pending_response: i64,
    pub recent_messages: i64,
    pub daily_statistics: Vec<DailyCount>,
}

// =============================================================================
// VALIDATION
// =============================================================================

fn required<'a>(value: Option<&'a str>, reason: &'static str) -> Result<&'a str, ContactError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContactError::Validation(reason)),
    }
}

/// Check a submission, in field order, returning the first problem found.
///
/// # Errors
///
/// Returns [`ContactError::Validation`] naming the failing rule.
pub fn validate_submission(form: &ContactSubmission) -> Result<(), ContactError> {
    required(form.name.as_deref(), "Name is required")?;
    let email = required(form.email.as_deref(), "Email is required")?;
    if !EMAIL_RE.is_match(email) {
        return Err(ContactError::Validation("Invalid email format"));
    }
    required(form.phone.as_deref(), "Phone number is required")?;
    required(form.subject.as_deref(), "Subject is required")?;
    let message = required(form.message.as_deref(), "Message is required")?;
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ContactError::Validation("Message is too long (maximum 5000 characters)"));
    }
    Ok(())
}

/// Resolve the client address from proxy headers, then the socket peer.
///
/// A comma-separated list yields its first entry. Headers whose first entry
/// is empty or `unknown` are skipped.
#[must_use]
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .filter_map(|v| v.split(',').next().map(str::trim))
        .find(|v| !v.is_empty() && !v.eq_ignore_ascii_case("unknown"))
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

// =============================================================================
// QUERIES
// =============================================================================

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, subject, message, is_read, is_responded, ip_address, user_agent, created_at";

/// Validate and store a submission.
///
/// # Errors
///
/// Returns [`ContactError::Validation`] for a bad form.
pub async fn submit(pool: &PgPool, form: &ContactSubmission, client: &ClientInfo) -> Result<ContactMessage, ContactError> {
    validate_submission(form)?;
    let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_owned();

    let sql = format!(
        "INSERT INTO contact_messages (name, email, phone, subject, message, ip_address, user_agent)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {CONTACT_COLUMNS}"
    );
    let saved = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(field(&form.name))
        .bind(field(&form.email))
        .bind(field(&form.phone))
        .bind(field(&form.subject))
        .bind(form.message.clone().unwrap_or_default())
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .fetch_one(pool)
        .await?;
    Ok(saved)
}

/// Every message, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_messages(pool: &PgPool) -> Result<Vec<ContactMessage>, ContactError> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY created_at DESC, id DESC");
    let messages = sqlx::query_as::<_, ContactMessage>(&sql).fetch_all(pool).await?;
    Ok(messages)
}

/// One message by id.
///
/// # Errors
///
/// Returns [`ContactError::NotFound`] when absent.
pub async fn get_message(pool: &PgPool, id: i64) -> Result<ContactMessage, ContactError> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = $1");
    let message = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    message.ok_or(ContactError::NotFound(id))
}

/// Messages sent from one address, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_messages_by_email(pool: &PgPool, email: &str) -> Result<Vec<ContactMessage>, ContactError> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE email = $1 ORDER BY created_at DESC, id DESC"
    );
    let messages = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(email)
        .fetch_all(pool)
        .await?;
    Ok(messages)
}

/// Set the read/responded flags. `None` leaves a flag unchanged.
///
/// # Errors
///
/// Returns [`ContactError::NotFound`] when absent.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    read: Option<bool>,
    responded: Option<bool>,
) -> Result<ContactMessage, ContactError> {
    let sql = format!(
        "UPDATE contact_messages
         SET is_read = COALESCE($2, is_read), is_responded = COALESCE($3, is_responded)
         WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
    );
    let message = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(id)
        .bind(read)
        .bind(responded)
        .fetch_optional(pool)
        .await?;
    message.ok_or(ContactError::NotFound(id))
}

/// Delete a message.
///
/// # Errors
///
/// Returns [`ContactError::NotFound`] when absent.
pub async fn delete_message(pool: &PgPool, id: i64) -> Result<(), ContactError> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContactError::NotFound(id));
    }
    Ok(())
}

/// Number of messages not yet marked read.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn unread_count(pool: &PgPool) -> Result<i64, ContactError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_messages WHERE NOT is_read")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Inbox totals plus per-day counts over the last seven days.
///
/// # Errors
///
/// Returns a database error if any query fails.
pub async fn statistics(pool: &PgPool) -> Result<ContactStatistics, ContactError> {
    let since = Utc::now() - Duration::days(RECENT_DAYS);

    let (total_messages, unread_messages, pending_response, recent_messages) =
        sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r"SELECT COUNT(*),
                     COUNT(*) FILTER (WHERE NOT is_read),
                     COUNT(*) FILTER (WHERE NOT is_responded),
                     COUNT(*) FILTER (WHERE created_at >= $1)
              FROM contact_messages",
        )
        .bind(since)
        .fetch_one(pool)
        .await?;

    let daily_statistics = sqlx::query_as::<_, DailyCount>(
        r"SELECT created_at::date AS date, COUNT(*) AS count
          FROM contact_messages
          WHERE created_at >= $1
          GROUP BY created_at::date
          ORDER BY date DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(ContactStatistics { total_messages, unread_messages, pending_response, recent_messages, daily_statistics })
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
