//! Outbound email for password-reset tokens.
//!
//! DESIGN
//! ======
//! Handlers depend on the [`Mailer`] trait so tests can swap in a recording
//! implementation. The production backend is Resend, configured from
//! `RESEND_API_KEY` and `RESEND_FROM`. When either is missing the server runs
//! without a mailer and reset tokens are only logged as generated.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

const PASSWORD_RESET_TEMPLATE: &str = include_str!("../../templates/password_reset.html");
const PASSWORD_RESET_SUBJECT: &str = "TaskNest Password Reset";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// A single outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Resend-backed mailer.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    /// Load from `RESEND_API_KEY` and `RESEND_FROM`.
    /// Returns `None` if either is missing (email delivery disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok().filter(|v| !v.trim().is_empty())?;
        let from = std::env::var("RESEND_FROM").ok().filter(|v| !v.trim().is_empty())?;
        Some(Self { client: Resend::new(&api_key), from })
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let to = [email.to.as_str()];
        let options = CreateEmailBaseOptions::new(&self.from, to, &email.subject).with_html(&email.html);
        self.client
            .emails
            .send(options)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/// Build the password-reset message for `email`.
#[must_use]
pub fn password_reset_email(email: &str, token: &str, ttl_minutes: u64) -> OutgoingEmail {
    OutgoingEmail {
        to: email.to_owned(),
        subject: PASSWORD_RESET_SUBJECT.to_owned(),
        html: render_password_reset_template(email, token, ttl_minutes),
    }
}

#[must_use]
pub fn render_password_reset_template(email: &str, token: &str, ttl_minutes: u64) -> String {
    PASSWORD_RESET_TEMPLATE
        .replace("{{EMAIL}}", email)
        .replace("{{TOKEN}}", token)
        .replace("{{MINUTES}}", &ttl_minutes.to_string())
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
