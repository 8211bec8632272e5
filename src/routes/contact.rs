//! Contact inbox routes.
//!
//! Every response, success or failure, is wrapped in [`Envelope`] so the
//! admin panel can branch on `success` without inspecting status codes.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, Request, State};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::rate_limit::Bucket;
use crate::services::contact::{self, ClientInfo, ContactError, ContactSubmission};
use crate::state::AppState;

const SERVICE_NAME: &str = "Contact Service";

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data), count: None, error: None, timestamp: Utc::now() }
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self { count: Some(count), ..Self::ok(items) }
    }
}

impl Envelope<()> {
    fn failure(message: String, error: Option<String>) -> Self {
        Self { success: false, message: Some(message), data: None, count: None, error, timestamp: Utc::now() }
    }

    fn done(message: &str) -> Self {
        Self { success: true, message: Some(message.to_owned()), data: None, count: None, error: None, timestamp: Utc::now() }
    }
}

pub(crate) fn contact_error_to_status(err: &ContactError) -> StatusCode {
    match err {
        ContactError::Validation(_) => StatusCode::BAD_REQUEST,
        ContactError::NotFound(_) => StatusCode::NOT_FOUND,
        ContactError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failure envelope. `fallback` is the client-facing message for server
/// errors, whose detail is logged rather than returned.
fn contact_error(err: ContactError, fallback: &str) -> Response {
    let status = contact_error_to_status(&err);
    let body = match &err {
        ContactError::Validation(reason) => Envelope::failure(format!("Validation error: {reason}"), None),
        ContactError::NotFound(_) => Envelope::failure(err.to_string(), None),
        ContactError::Database(e) => {
            tracing::error!(error = %e, "contact inbox query failed");
            Envelope::failure(fallback.to_owned(), Some("database error".to_owned()))
        }
    };
    (status, Json(body)).into_response()
}

// =============================================================================
// ENVELOPED EXTRACTORS
// =============================================================================

/// Failure envelope for a request the extractors could not decode.
fn rejection_envelope(status: StatusCode, detail: String) -> Response {
    let body = Envelope::failure("Invalid request".to_owned(), Some(detail));
    (status, Json(body)).into_response()
}

/// `Json` whose rejection is an [`Envelope`].
pub struct EnvelopeJson<T>(pub T);

impl<S, T> FromRequest<S> for EnvelopeJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_envelope(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Path` whose rejection is an [`Envelope`].
pub struct EnvelopePath<T>(pub T);

impl<S, T> FromRequestParts<S> for EnvelopePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_envelope(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Query` whose rejection is an [`Envelope`].
pub struct EnvelopeQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for EnvelopeQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_envelope(rejection.status(), rejection.body_text())),
        }
    }
}

// =============================================================================
// CLIENT ADDRESS
// =============================================================================

/// Socket peer address, when the server was started with connect info.
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(peer))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/contact/submit`
pub async fn submit(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    EnvelopeJson(form): EnvelopeJson<ContactSubmission>,
) -> Response {
    let ip_address = contact::client_ip(&headers, peer);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let limit_key = ip_address.as_deref().unwrap_or("unknown");
    if let Err(e) = state.rate_limiter.check_and_record(Bucket::ContactSubmit, limit_key) {
        tracing::warn!(ip = %limit_key, "contact submission rate limited");
        let body = Envelope::failure(
            "Too many messages. Please try again later.".to_owned(),
            Some(e.to_string()),
        );
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    let client = ClientInfo { ip_address, user_agent };
    match contact::submit(&state.pool, &form, &client).await {
        Ok(saved) => {
            tracing::info!(id = saved.id, "contact message received");
            let body = Envelope::ok(saved)
                .with_message("Your message has been sent successfully! We'll get back to you soon.");
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => contact_error(e, "Failed to submit your message. Please try again later."),
    }
}

/// `GET /api/contact/messages`
pub async fn list_messages(State(state): State<AppState>) -> Response {
    match contact::list_messages(&state.pool).await {
        Ok(messages) => Json(Envelope::list(messages)).into_response(),
        Err(e) => contact_error(e, "Failed to retrieve messages"),
    }
}

/// `GET /api/contact/messages/{id}`
pub async fn get_message(State(state): State<AppState>, EnvelopePath(id): EnvelopePath<i64>) -> Response {
    match contact::get_message(&state.pool, id).await {
        Ok(message) => Json(Envelope::ok(message)).into_response(),
        Err(e) => contact_error(e, "Failed to retrieve message"),
    }
}

/// `GET /api/contact/messages/email/{email}`
pub async fn messages_by_email(State(state): State<AppState>, EnvelopePath(email): EnvelopePath<String>) -> Response {
    match contact::list_messages_by_email(&state.pool, &email).await {
        Ok(messages) => Json(Envelope::list(messages)).into_response(),
        Err(e) => contact_error(e, "Failed to retrieve messages"),
    }
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub read: Option<bool>,
    pub responded: Option<bool>,
}

/// `PUT /api/contact/messages/{id}/status?read=&responded=`
pub async fn update_status(
    State(state): State<AppState>,
    EnvelopePath(id): EnvelopePath<i64>,
    EnvelopeQuery(query): EnvelopeQuery<StatusQuery>,
) -> Response {
    match contact::update_status(&state.pool, id, query.read, query.responded).await {
        Ok(message) => Json(Envelope::ok(message).with_message("Message status updated successfully")).into_response(),
        Err(e) => contact_error(e, "Failed to update message status"),
    }
}

/// `PUT /api/contact/messages/{id}/read`
pub async fn mark_read(State(state): State<AppState>, EnvelopePath(id): EnvelopePath<i64>) -> Response {
    match contact::update_status(&state.pool, id, Some(true), None).await {
        Ok(message) => Json(Envelope::ok(message).with_message("Message marked as read")).into_response(),
        Err(e) => contact_error(e, "Failed to mark message as read"),
    }
}

/// `PUT /api/contact/messages/{id}/responded`
pub async fn mark_responded(State(state): State<AppState>, EnvelopePath(id): EnvelopePath<i64>) -> Response {
    match contact::update_status(&state.pool, id, None, Some(true)).await {
        Ok(message) => Json(Envelope::ok(message).with_message("Message marked as responded")).into_response(),
        Err(e) => contact_error(e, "Failed to mark message as responded"),
    }
}

/// `DELETE /api/contact/messages/{id}`
pub async fn delete_message(State(state): State<AppState>, EnvelopePath(id): EnvelopePath<i64>) -> Response {
    match contact::delete_message(&state.pool, id).await {
        Ok(()) => Json(Envelope::done("Message deleted successfully")).into_response(),
        Err(e) => contact_error(e, "Failed to delete message"),
    }
}

/// `GET /api/contact/statistics`
pub async fn statistics(State(state): State<AppState>) -> Response {
    match contact::statistics(&state.pool).await {
        Ok(stats) => Json(Envelope::ok(stats)).into_response(),
        Err(e) => contact_error(e, "Failed to retrieve statistics"),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub success: bool,
    pub unread_count: i64,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/contact/unread-count`
pub async fn unread_count(State(state): State<AppState>) -> Response {
    match contact::unread_count(&state.pool).await {
        Ok(count) => Json(UnreadCount { success: true, unread_count: count, timestamp: Utc::now() }).into_response(),
        Err(e) => contact_error(e, "Failed to retrieve unread count"),
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/contact/health`
pub async fn health() -> Json<Health> {
    Json(Health { status: "UP", service: SERVICE_NAME, version: env!("CARGO_PKG_VERSION"), timestamp: Utc::now() })
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
