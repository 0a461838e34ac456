use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;

use crate::planner::Planner;
use crate::schedule::GridConfig;
use crate::server::endpoints::{grades, schedule, status, subjects};

mod endpoints;
mod types;

pub use types::ApiErrorType;

/// State shared by every request handler.
pub struct AppState {
    pub planner: Planner,
    pub grid: GridConfig,
}

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let subject_router = Router::new()
        .route("/subjects", get(subjects::get_subjects))
        .route("/subjects/available", get(subjects::get_available))
        .route("/subjects/:code", get(subjects::get_subject))
        .route("/subjects/:code/status", put(subjects::put_status))
        .route("/subjects/:code/notes", put(subjects::put_notes))
        .route("/progress", get(subjects::get_progress));

    let grade_router = Router::new()
        .route("/grades", get(grades::get_grades))
        .route("/grades/presets", get(grades::get_presets))
        .route(
            "/grades/:id",
            put(grades::put_grade).delete(grades::delete_grade),
        )
        .route(
            "/subjects/:code/grades",
            axum::routing::post(grades::post_grade),
        );

    let schedule_router = Router::new()
        .route(
            "/schedule",
            get(schedule::get_schedule).post(schedule::post_entry),
        )
        .route(
            "/schedule/:id",
            put(schedule::put_entry).delete(schedule::delete_entry),
        )
        .route("/schedule/:id/select", axum::routing::post(schedule::post_select))
        .route("/schedule/selection", axum::routing::delete(schedule::delete_selection))
        .route("/schedule/layout", get(schedule::get_layout))
        .route("/schedule/time_options", get(schedule::get_time_options));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(subject_router)
        .merge(grade_router)
        .merge(schedule_router)
        .with_state(app_state)
}
