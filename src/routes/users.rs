//! User routes: signup, login sessions, profile CRUD, search, password resets.

use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::error_response;
use crate::rate_limit::Bucket;
use crate::services::password_reset::{self, ResetError};
use crate::services::session;
use crate::services::user::{self, SignupRequest, UpdateUserRequest, User, UserError};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const SESSION_DAYS: i64 = 30;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(SESSION_DAYS))
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn user_error_to_status(err: &UserError) -> StatusCode {
    match err {
        UserError::InvalidEmail
        | UserError::PasswordMismatch
        | UserError::PasswordTooShort
        | UserError::InvalidAgeRange { .. } => StatusCode::BAD_REQUEST,
        UserError::AlreadyExists(_) => StatusCode::CONFLICT,
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        UserError::Hash(_) | UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn reset_error_to_status(err: &ResetError) -> StatusCode {
    match err {
        ResetError::UserNotFound | ResetError::InvalidToken => StatusCode::BAD_REQUEST,
        ResetError::User(inner) => match user_error_to_status(inner) {
            StatusCode::NOT_FOUND => StatusCode::BAD_REQUEST,
            other => other,
        },
        ResetError::Mail(_) => StatusCode::BAD_GATEWAY,
        ResetError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn user_error(err: UserError) -> Response {
    error_response(user_error_to_status(&err), err)
}

fn reset_error(err: ResetError) -> Response {
    error_response(reset_error_to_status(&err), err)
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// `POST /api/users/signup`: register a user.
pub async fn signup(State(state): State<AppState>, Json(body): Json<SignupRequest>) -> Response {
    match user::create_user(&state.pool, body).await {
        Ok(created) => {
            tracing::info!(email = %created.email_id, "user registered");
            Json(created).into_response()
        }
        Err(e) => user_error(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email_id: String,
    pub password: String,
}

/// `POST /api/users/login`: check credentials and start a session.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    let found = match user::authenticate(&state.pool, &body.email_id, &body.password).await {
        Ok(found) => found,
        Err(e) => return user_error(e),
    };
    let Some(found) = found else {
        return (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response();
    };

    let token = match session::create_session(&state.pool, &found.email_id).await {
        Ok(t) => t,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    (jar, Json(found)).into_response()
}

/// `GET /api/users/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

/// `POST /api/users/logout`: delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed during logout");
    }
    let jar = CookieJar::new().add(cleared_session_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

// =============================================================================
// PROFILE CRUD
// =============================================================================

/// `GET /api/users`: list all users.
pub async fn list_users(State(state): State<AppState>) -> Response {
    match user::list_users(&state.pool).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => user_error(e),
    }
}

/// `GET /api/users/{emailId}`
pub async fn get_user(State(state): State<AppState>, Path(email_id): Path<String>) -> Response {
    match user::get_user(&state.pool, &email_id).await {
        Ok(Some(found)) => Json(found).into_response(),
        Ok(None) => user_error(UserError::NotFound(email_id)),
        Err(e) => user_error(e),
    }
}

/// `PUT /api/users/{emailId}`: replace profile fields.
pub async fn update_user(
    State(state): State<AppState>,
    Path(email_id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Response {
    match user::update_user(&state.pool, &email_id, body).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => user_error(e),
    }
}

/// `DELETE /api/users/{emailId}`
pub async fn delete_user(State(state): State<AppState>, Path(email_id): Path<String>) -> Response {
    match user::delete_user(&state.pool, &email_id).await {
        Ok(()) => format!("User deleted successfully with email ID: {email_id}").into_response(),
        Err(e) => user_error(e),
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// `GET /api/users/search/name/{name}`
pub async fn search_by_name(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match user::find_by_name(&state.pool, &name).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => user_error(e),
    }
}

/// `GET /api/users/search/profession/{profession}`
pub async fn search_by_profession(State(state): State<AppState>, Path(profession): Path<String>) -> Response {
    match user::find_by_profession(&state.pool, &profession).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => user_error(e),
    }
}

#[derive(Deserialize)]
pub struct AgeRangeQuery {
    pub min: i32,
    pub max: i32,
}

/// `GET /api/users/search/age?min=&max=`
pub async fn search_by_age(State(state): State<AppState>, Query(range): Query<AgeRangeQuery>) -> Response {
    match user::find_by_age_range(&state.pool, range.min, range.max).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => user_error(e),
    }
}

/// `GET /api/users/search/gmail`
pub async fn search_gmail(State(state): State<AppState>) -> Response {
    match user::find_gmail_users(&state.pool).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => user_error(e),
    }
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

#[derive(Deserialize)]
pub struct NewPasswordBody {
    pub password: String,
}

/// `PUT /api/users/{emailId}/reset-normal`: set a password without a token.
pub async fn reset_normal(
    State(state): State<AppState>,
    Path(email_id): Path<String>,
    Json(body): Json<NewPasswordBody>,
) -> Response {
    match user::set_password(&state.pool, &email_id, &body.password).await {
        Ok(_) => "Password reset successfully".into_response(),
        // Unknown users are a client error here, not a missing resource.
        Err(e @ UserError::NotFound(_)) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e) => user_error(e),
    }
}

#[derive(Deserialize)]
pub struct ForgotPasswordBody {
    pub email: String,
}

/// `POST /api/users/forgot-password`: issue a reset token.
pub async fn forgot_password(State(state): State<AppState>, Json(body): Json<ForgotPasswordBody>) -> Response {
    let key = body.email.trim().to_ascii_lowercase();
    if let Err(e) = state.rate_limiter.check_and_record(Bucket::PasswordReset, &key) {
        tracing::warn!(email = %key, "password reset rate limited");
        return error_response(StatusCode::TOO_MANY_REQUESTS, e);
    }

    match password_reset::request_reset(&state.pool, &state.reset_tokens, state.mailer.as_deref(), &body.email).await {
        Ok(token) if state.config.reset_token_echo => {
            format!("Reset token generated (demo): {token}").into_response()
        }
        Ok(_) => "Reset token generated".into_response(),
        Err(e) => reset_error(e),
    }
}

#[derive(Deserialize)]
pub struct VerifyTokenBody {
    pub email: String,
    pub token: String,
}

/// `POST /api/users/verify-reset-token`: check a token without using it.
pub async fn verify_reset_token(State(state): State<AppState>, Json(body): Json<VerifyTokenBody>) -> Response {
    if password_reset::verify_reset(&state.reset_tokens, &body.email, &body.token).await {
        "Reset token is valid".into_response()
    } else {
        reset_error(ResetError::InvalidToken)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub email: Option<String>,
    pub token: String,
    pub new_password: String,
}

/// `POST /api/users/{emailId}/reset-password`: redeem a token.
///
/// An email in the body takes precedence over the path segment.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(email_id): Path<String>,
    Json(body): Json<ResetPasswordBody>,
) -> Response {
    let email = body
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(&email_id);

    match password_reset::reset_password(&state.pool, &state.reset_tokens, email, &body.token, &body.new_password).await {
        Ok(()) => "Password reset successful".into_response(),
        Err(e) => reset_error(e),
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
