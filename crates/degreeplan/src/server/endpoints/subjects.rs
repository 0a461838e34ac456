//! Endpoints for subject statuses, notes and overall progress.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::progress::Status;
use crate::server::types::ApiErrorType;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct NotesBody {
    #[serde(default)]
    pub notes: String,
}

/// GET /subjects
///
/// Every catalog subject with its status, blocked flag and grades.
pub async fn get_subjects(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /subjects");
    (StatusCode::OK, Json(s.planner.subject_views())).into_response()
}

/// GET /subjects/available
///
/// Subjects that are neither approved nor blocked.
pub async fn get_available(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /subjects/available");
    (StatusCode::OK, Json(s.planner.available_subjects())).into_response()
}

/// GET /subjects/:code
pub async fn get_subject(Path(code): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /subjects/{}", code);

    match s.planner.subject_view(&code) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// PUT /subjects/:code/status
pub async fn put_status(
    Path(code): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<StatusBody>,
) -> Response {
    info!("PUT /subjects/{}/status ({})", code, body.status);

    match s.planner.set_status(&code, body.status).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// PUT /subjects/:code/notes
pub async fn put_notes(
    Path(code): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<NotesBody>,
) -> Response {
    info!("PUT /subjects/{}/notes", code);

    match s.planner.set_notes(&code, &body.notes).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /progress
///
/// Status counts, grade average and completion percent, overall and per year.
pub async fn get_progress(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /progress");
    (StatusCode::OK, Json(s.planner.progress_report())).into_response()
}
