use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::PlannerError;

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            details,
        }
    }
}

impl From<PlannerError> for ApiErrorType {
    fn from(err: PlannerError) -> Self {
        let (status, error) = match &err {
            PlannerError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid input"),
            PlannerError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found"),
            PlannerError::Persistence { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not save changes")
            }
        };

        Self::from((status, error, Some(err.to_string())))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
