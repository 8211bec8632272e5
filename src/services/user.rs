//! User account service: signup, profile CRUD, search, and login checks.
//!
//! DESIGN
//! ======
//! Users are keyed by their normalized (trimmed, lowercased) email address.
//! Password hashes never leave this module: every query projects the public
//! [`User`] columns only, and credential checks go through [`authenticate`].

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::password::{self, HashError, MIN_PASSWORD_LEN};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("Password and Confirm Password do not match!")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters", min = MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("invalid age range: min {min} is greater than max {max}")]
    InvalidAgeRange { min: i32, max: i32 },
    #[error("user already exists: {0}")]
    AlreadyExists(String),
    #[error("User not found")]
    NotFound(String),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Public view of a `users` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email_id: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub profession: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email_id: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub profession: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub profession: String,
    /// Rehashed when present and non-empty.
    #[serde(default)]
    pub password: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn validate_new_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::PasswordTooShort);
    }
    Ok(())
}

fn lookup_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// =============================================================================
// CRUD
// =============================================================================

/// Register a new user.
///
/// # Errors
///
/// Returns a validation error for a bad email or password pair,
/// [`UserError::AlreadyExists`] if the email is taken, or a database error.
pub async fn create_user(pool: &PgPool, req: SignupRequest) -> Result<User, UserError> {
    let email = normalize_email(&req.email_id).ok_or(UserError::InvalidEmail)?;
    if req.password != req.confirm_password {
        return Err(UserError::PasswordMismatch);
    }
    validate_new_password(&req.password)?;
    let hash = password::hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r"INSERT INTO users (email_id, full_name, age, gender, profession, password_hash)
          VALUES ($1, $2, $3, $4, $5, $6)
          ON CONFLICT (email_id) DO NOTHING
          RETURNING email_id, full_name AS name, age, gender, profession",
    )
    .bind(&email)
    .bind(req.name.trim())
    .bind(req.age)
    .bind(req.gender.trim())
    .bind(req.profession.trim())
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    user.ok_or(UserError::AlreadyExists(email))
}

/// List all users.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, UserError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT email_id, full_name AS name, age, gender, profession FROM users ORDER BY email_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Fetch one user by email.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_user(pool: &PgPool, email: &str) -> Result<Option<User>, UserError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT email_id, full_name AS name, age, gender, profession FROM users WHERE email_id = $1",
    )
    .bind(lookup_key(email))
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Replace profile fields, rehashing the password when one is supplied.
///
/// # Errors
///
/// Returns [`UserError::NotFound`] when no user has this email.
pub async fn update_user(pool: &PgPool, email: &str, req: UpdateUserRequest) -> Result<User, UserError> {
    let new_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => {
            validate_new_password(p)?;
            Some(password::hash_password(p)?)
        }
        None => None,
    };

    let user = sqlx::query_as::<_, User>(
        r"UPDATE users
          SET full_name = $2,
              age = $3,
              gender = $4,
              profession = $5,
              password_hash = COALESCE($6, password_hash)
          WHERE email_id = $1
          RETURNING email_id, full_name AS name, age, gender, profession",
    )
    .bind(lookup_key(email))
    .bind(req.name.trim())
    .bind(req.age)
    .bind(req.gender.trim())
    .bind(req.profession.trim())
    .bind(new_hash)
    .fetch_optional(pool)
    .await?;

    user.ok_or_else(|| UserError::NotFound(email.to_owned()))
}

/// Delete a user.
///
/// # Errors
///
/// Returns [`UserError::NotFound`] when no user has this email.
pub async fn delete_user(pool: &PgPool, email: &str) -> Result<(), UserError> {
    let result = sqlx::query("DELETE FROM users WHERE email_id = $1")
        .bind(lookup_key(email))
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(UserError::NotFound(email.to_owned()));
    }
    Ok(())
}

/// Overwrite a user's password without any token check.
///
/// # Errors
///
/// Returns a validation error for short passwords or [`UserError::NotFound`].
pub async fn set_password(pool: &PgPool, email: &str, new_password: &str) -> Result<User, UserError> {
    validate_new_password(new_password)?;
    let hash = password::hash_password(new_password)?;

    let user = sqlx::query_as::<_, User>(
        r"UPDATE users SET password_hash = $2 WHERE email_id = $1
          RETURNING email_id, full_name AS name, age, gender, profession",
    )
    .bind(lookup_key(email))
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    user.ok_or_else(|| UserError::NotFound(email.to_owned()))
}

/// Check credentials, returning the user on success.
///
/// # Errors
///
/// Returns a database error if the lookup fails.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Option<User>, UserError> {
    let row = sqlx::query_as::<_, (String, String, i32, String, String, String)>(
        r"SELECT email_id, full_name, age, gender, profession, password_hash
          FROM users WHERE email_id = $1",
    )
    .bind(lookup_key(email))
    .fetch_optional(pool)
    .await?;

    let Some((email_id, name, age, gender, profession, hash)) = row else {
        return Ok(None);
    };
    if !password::verify_password(password, &hash) {
        return Ok(None);
    }
    Ok(Some(User { email_id, name, age, gender, profession }))
}

// =============================================================================
// SEARCH
// =============================================================================

/// Users whose full name matches exactly.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Vec<User>, UserError> {
    let users = sqlx::query_as::<_, User>(
        r"SELECT email_id, full_name AS name, age, gender, profession
          FROM users WHERE full_name = $1 ORDER BY email_id",
    )
    .bind(name)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Users with the given profession, ignoring case.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_by_profession(pool: &PgPool, profession: &str) -> Result<Vec<User>, UserError> {
    let users = sqlx::query_as::<_, User>(
        r"SELECT email_id, full_name AS name, age, gender, profession
          FROM users WHERE lower(profession) = lower($1) ORDER BY email_id",
    )
    .bind(profession)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Users whose age falls in `min..=max`.
///
/// # Errors
///
/// Returns [`UserError::InvalidAgeRange`] when `min > max`.
pub async fn find_by_age_range(pool: &PgPool, min: i32, max: i32) -> Result<Vec<User>, UserError> {
    if min > max {
        return Err(UserError::InvalidAgeRange { min, max });
    }
    let users = sqlx::query_as::<_, User>(
        r"SELECT email_id, full_name AS name, age, gender, profession
          FROM users WHERE age BETWEEN $1 AND $2 ORDER BY age, email_id",
    )
    .bind(min)
    .bind(max)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Users registered with a `@gmail.com` address.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_gmail_users(pool: &PgPool) -> Result<Vec<User>, UserError> {
    let users = sqlx::query_as::<_, User>(
        r"SELECT email_id, full_name AS name, age, gender, profession
          FROM users WHERE email_id LIKE '%@gmail.com' ORDER BY email_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
