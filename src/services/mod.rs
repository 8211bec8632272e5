//! Domain services.
//!
//! Each module owns one table (or one concern) and exposes plain async
//! functions over a `&PgPool`. Route handlers stay thin: they parse the
//! request, call a service, and map the service's error enum to a status.

pub mod admin;
pub mod budget;
pub mod contact;
pub mod expense;
pub mod mailer;
pub mod mood;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod task;
pub mod user;
