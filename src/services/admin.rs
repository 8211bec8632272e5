//! Admin account service.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use super::password::{self, HashError};
use super::user::normalize_email;
use crate::config::AdminSeed;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("Password must be at least {min} characters", min = password::MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("admin already exists: {0}")]
    AlreadyExists(String),
    #[error("admin not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub admin_email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredentials {
    pub admin_email: String,
    pub password: String,
}

fn check_password(password: &str) -> Result<(), AdminError> {
    if password.chars().count() < password::MIN_PASSWORD_LEN {
        return Err(AdminError::PasswordTooShort);
    }
    Ok(())
}

/// Create an admin account.
///
/// # Errors
///
/// Returns [`AdminError::AlreadyExists`] if the email is taken.
pub async fn create_admin(pool: &PgPool, creds: &AdminCredentials) -> Result<Admin, AdminError> {
    let email = normalize_email(&creds.admin_email).ok_or(AdminError::InvalidEmail)?;
    check_password(&creds.password)?;
    let hash = password::hash_password(&creds.password)?;

    let admin = sqlx::query_as::<_, Admin>(
        r"INSERT INTO admins (admin_email, password_hash) VALUES ($1, $2)
          ON CONFLICT (admin_email) DO NOTHING
          RETURNING admin_email",
    )
    .bind(&email)
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    admin.ok_or(AdminError::AlreadyExists(email))
}

/// List all admins.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_admins(pool: &PgPool) -> Result<Vec<Admin>, AdminError> {
    let admins = sqlx::query_as::<_, Admin>("SELECT admin_email FROM admins ORDER BY admin_email")
        .fetch_all(pool)
        .await?;
    Ok(admins)
}

/// Fetch one admin by email.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_admin(pool: &PgPool, email: &str) -> Result<Option<Admin>, AdminError> {
    let admin = sqlx::query_as::<_, Admin>("SELECT admin_email FROM admins WHERE admin_email = $1")
        .bind(email.trim().to_ascii_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(admin)
}

/// Change an admin's password.
///
/// # Errors
///
/// Returns [`AdminError::NotFound`] when no admin has this email.
pub async fn update_admin_password(pool: &PgPool, email: &str, new_password: &str) -> Result<Admin, AdminError> {
    check_password(new_password)?;
    let hash = password::hash_password(new_password)?;

    let admin = sqlx::query_as::<_, Admin>(
        "UPDATE admins SET password_hash = $2 WHERE admin_email = $1 RETURNING admin_email",
    )
    .bind(email.trim().to_ascii_lowercase())
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    admin.ok_or_else(|| AdminError::NotFound(email.to_owned()))
}

/// Delete an admin.
///
/// # Errors
///
/// Returns [`AdminError::NotFound`] when no admin has this email.
pub async fn delete_admin(pool: &PgPool, email: &str) -> Result<(), AdminError> {
    let result = sqlx::query("DELETE FROM admins WHERE admin_email = $1")
        .bind(email.trim().to_ascii_lowercase())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(email.to_owned()));
    }
    Ok(())
}

/// Check admin credentials.
///
/// # Errors
///
/// Returns a database error if the lookup fails.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Option<Admin>, AdminError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT admin_email, password_hash FROM admins WHERE admin_email = $1",
    )
    .bind(email.trim().to_ascii_lowercase())
    .fetch_optional(pool)
    .await?;

    Ok(row
        .filter(|(_, hash)| password::verify_password(password, hash))
        .map(|(admin_email, _)| Admin { admin_email }))
}

/// Create the configured bootstrap admin if it does not exist yet.
///
/// # Errors
///
/// Returns validation or database errors from [`create_admin`].
pub async fn seed_admin(pool: &PgPool, seed: &AdminSeed) -> Result<bool, AdminError> {
    let creds = AdminCredentials { admin_email: seed.email.clone(), password: seed.password.clone() };
    match create_admin(pool, &creds).await {
        Ok(admin) => {
            info!(email = %admin.admin_email, "seeded bootstrap admin");
            Ok(true)
        }
        Err(AdminError::AlreadyExists(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
