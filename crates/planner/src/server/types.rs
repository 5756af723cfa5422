use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::plan::PlanError;

/// An error returned to API clients as `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiErrorType {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, message, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            message: message.to_string(),
            details,
        }
    }
}

impl From<PlanError> for ApiErrorType {
    fn from(err: PlanError) -> Self {
        let (status, message) = match &err {
            PlanError::InvalidRating(_) => (StatusCode::BAD_REQUEST, "Invalid rating"),
            PlanError::UnknownCourse { .. } => (StatusCode::NOT_FOUND, "Course not in plan"),
            PlanError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Plan storage failed"),
        };
        Self::from((status, message, Some(err.to_string())))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.message,
                "details": self.details,
            })),
        )
            .into_response()
    }
}
