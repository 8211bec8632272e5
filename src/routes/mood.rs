//! Mood journal routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::error_response;
use crate::services::mood::{self, MoodError, NewMoodEntry};
use crate::state::AppState;

pub(crate) fn mood_error_to_status(err: &MoodError) -> StatusCode {
    match err {
        MoodError::InvalidDay(_) => StatusCode::BAD_REQUEST,
        MoodError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn mood_error(err: MoodError) -> Response {
    error_response(mood_error_to_status(&err), err)
}

/// `POST /api/mood`
pub async fn save_mood(State(state): State<AppState>, Json(body): Json<NewMoodEntry>) -> Response {
    match mood::save_entry(&state.pool, &body).await {
        Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
        Err(e) => mood_error(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_email: String,
}

/// `GET /api/mood?userEmail=`
pub async fn history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Response {
    match mood::history(&state.pool, &query.user_email).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => mood_error(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayQuery {
    pub user_email: String,
    pub day: String,
}

/// `GET /api/mood/day?userEmail=&day=`
pub async fn mood_for_day(State(state): State<AppState>, Query(query): Query<DayQuery>) -> Response {
    let day = match mood::parse_day(&query.day) {
        Ok(d) => d,
        Err(e) => return mood_error(e),
    };
    match mood::entry_for_day(&state.pool, &query.user_email, day).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => mood_error(e),
    }
}

#[cfg(test)]
#[path = "mood_test.rs"]
mod tests;
