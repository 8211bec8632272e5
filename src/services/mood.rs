//! Mood journal service.
//!
//! Entries are stored as the client sends them. `timestamp` is the client's
//! ISO-8601 string and `details` is an opaque JSON document; neither is
//! interpreted here beyond ordering history by `timestamp`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum MoodError {
    #[error("invalid day '{0}', expected YYYY-MM-DD")]
    InvalidDay(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: i64,
    pub day: NaiveDate,
    pub mood: String,
    pub score: String,
    pub user_email: String,
    pub timestamp: String,
    pub details: Option<String>,
}

/// Unknown fields such as `suggestions` are dropped by serde.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoodEntry {
    pub day: NaiveDate,
    pub mood: String,
    pub score: String,
    pub user_email: String,
    pub timestamp: String,
    #[serde(default)]
    pub details: Option<String>,
}

const MOOD_COLUMNS: &str = r#"id, day, mood, score, user_email, "timestamp", details"#;

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Parse a `YYYY-MM-DD` query value.
///
/// # Errors
///
/// Returns [`MoodError::InvalidDay`] for anything else.
pub fn parse_day(raw: &str) -> Result<NaiveDate, MoodError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| MoodError::InvalidDay(raw.to_owned()))
}

/// Save a journal entry.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn save_entry(pool: &PgPool, entry: &NewMoodEntry) -> Result<MoodEntry, MoodError> {
    let sql = format!(
        r#"INSERT INTO mood_tracks (day, mood, score, user_email, "timestamp", details)
           VALUES ($1, $2, $3, $4, $5, $6) RETURNING {MOOD_COLUMNS}"#
    );
    let saved = sqlx::query_as::<_, MoodEntry>(&sql)
        .bind(entry.day)
        .bind(&entry.mood)
        .bind(&entry.score)
        .bind(email_key(&entry.user_email))
        .bind(&entry.timestamp)
        .bind(&entry.details)
        .fetch_one(pool)
        .await?;
    Ok(saved)
}

/// A user's entries, newest `timestamp` first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn history(pool: &PgPool, email: &str) -> Result<Vec<MoodEntry>, MoodError> {
    let sql = format!(
        r#"SELECT {MOOD_COLUMNS} FROM mood_tracks WHERE user_email = $1 ORDER BY "timestamp" DESC, id DESC"#
    );
    let entries = sqlx::query_as::<_, MoodEntry>(&sql)
        .bind(email_key(email))
        .fetch_all(pool)
        .await?;
    Ok(entries)
}

/// The entry for one calendar day. When a day was logged more than once the
/// latest entry wins.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn entry_for_day(pool: &PgPool, email: &str, day: NaiveDate) -> Result<Option<MoodEntry>, MoodError> {
    let sql = format!(
        r#"SELECT {MOOD_COLUMNS} FROM mood_tracks WHERE user_email = $1 AND day = $2
           ORDER BY "timestamp" DESC, id DESC LIMIT 1"#
    );
    let entry = sqlx::query_as::<_, MoodEntry>(&sql)
        .bind(email_key(email))
        .bind(day)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

#[cfg(test)]
#[path = "mood_test.rs"]
mod tests;
