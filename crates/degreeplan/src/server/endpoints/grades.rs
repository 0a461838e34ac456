//! Endpoints for graded evaluations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::progress::{GradeInput, EVAL_PRESETS};
use crate::server::types::ApiErrorType;
use crate::server::AppState;

/// GET /grades
///
/// All evaluations, oldest first.
pub async fn get_grades(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /grades");
    (StatusCode::OK, Json(s.planner.grades())).into_response()
}

/// GET /grades/presets
pub async fn get_presets() -> Response {
    (StatusCode::OK, Json(EVAL_PRESETS)).into_response()
}

/// POST /subjects/:code/grades
pub async fn post_grade(
    Path(code): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(input): Json<GradeInput>,
) -> Response {
    info!("POST /subjects/{}/grades", code);

    match s.planner.add_grade(&code, input).await {
        Ok(grade) => (StatusCode::CREATED, Json(grade)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// PUT /grades/:id
pub async fn put_grade(
    Path(id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Json(input): Json<GradeInput>,
) -> Response {
    info!("PUT /grades/{}", id);

    match s.planner.update_grade(id, input).await {
        Ok(grade) => (StatusCode::OK, Json(grade)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// DELETE /grades/:id
pub async fn delete_grade(Path(id): Path<i64>, State(s): State<Arc<AppState>>) -> Response {
    info!("DELETE /grades/{}", id);

    match s.planner.delete_grade(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
