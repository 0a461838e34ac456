use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::schedule::{end_time_options, hhmm, time_options, ScheduleEntryInput};
use crate::server::types::ApiErrorType;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    /// Entry to draw as active; defaults to the current selection
    pub active: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TimeOptionsQuery {
    /// Chosen start time (`HH:MM`); filters the end options
    pub start: Option<String>,
}

/// GET /schedule
/// Returns every schedule entry, ordered by day and start time
pub async fn get_schedule(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedule");
    (StatusCode::OK, Json(s.planner.schedule())).into_response()
}

/// POST /schedule
pub async fn post_entry(
    State(s): State<Arc<AppState>>,
    Json(input): Json<ScheduleEntryInput>,
) -> Response {
    info!("POST /schedule ({} {})", input.day_of_week, input.subject_name);

    match s.planner.add_schedule_entry(input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// PUT /schedule/:id
pub async fn put_entry(
    Path(id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Json(input): Json<ScheduleEntryInput>,
) -> Response {
    info!("PUT /schedule/{}", id);

    match s.planner.update_schedule_entry(id, input).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// DELETE /schedule/:id
pub async fn delete_entry(Path(id): Path<i64>, State(s): State<Arc<AppState>>) -> Response {
    info!("DELETE /schedule/{}", id);

    match s.planner.delete_schedule_entry(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /schedule/:id/select
/// Toggles the selection of an entry and returns the active entry id
pub async fn post_select(Path(id): Path<i64>, State(s): State<Arc<AppState>>) -> Response {
    info!("POST /schedule/{}/select", id);

    match s.planner.select_entry(id) {
        Ok(active) => (StatusCode::OK, Json(json!({ "active": active }))).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// DELETE /schedule/selection
pub async fn delete_selection(State(s): State<Arc<AppState>>) -> Response {
    info!("DELETE /schedule/selection");
    s.planner.clear_selection();
    StatusCode::NO_CONTENT.into_response()
}

/// GET /schedule/layout
/// Returns block geometry for every day column of the grid
pub async fn get_layout(
    State(s): State<Arc<AppState>>,
    Query(query): Query<LayoutQuery>,
) -> Response {
    info!("GET /schedule/layout (active={:?})", query.active);
    (
        StatusCode::OK,
        Json(s.planner.week_layout(&s.grid, query.active)),
    )
        .into_response()
}

/// GET /schedule/time_options
/// Returns the start times and, for a chosen start, the valid end times
pub async fn get_time_options(
    State(s): State<Arc<AppState>>,
    Query(query): Query<TimeOptionsQuery>,
) -> Response {
    let to_labels = |times: Vec<chrono::NaiveTime>| -> Vec<String> {
        times
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect()
    };

    let start_options = to_labels(time_options(&s.grid));
    let end_options = match query.start.as_deref().map(hhmm::parse) {
        None => start_options.iter().skip(1).cloned().collect(),
        Some(Ok(start)) => to_labels(end_time_options(&s.grid, start)),
        Some(Err(e)) => {
            return ApiErrorType::from((
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid start time",
                Some(e.to_string()),
            ))
            .into_response()
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "start_options": start_options,
            "end_options": end_options,
        })),
    )
        .into_response()
}
