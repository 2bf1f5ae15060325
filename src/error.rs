use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::schedule::ScheduleError;
use crate::service::ServiceError;
use crate::store::StoreError;

const LOG_TARGET: &str = "web::error";

/// Everything a handler can fail with, rendered as `{"success": false, "error": ...}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Internal(String),
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        ApiError::Service(err.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Schedule(ScheduleError::Conflict(_))) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::Schedule(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Store(StoreError::Stale { .. })) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::Store(StoreError::Config(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Service(ServiceError::Store(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(target = LOG_TARGET, %status, error = %self, "request failed");
        }

        let message = match self {
            // Upstream bodies can carry schema details; keep them in the logs only
            ApiError::Service(ServiceError::Store(StoreError::Http { .. }))
            | ApiError::Service(ServiceError::Store(StoreError::Status { .. })) => {
                "Backing store request failed".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({ "success": false, "error": message });
        if let ApiError::Service(ServiceError::Schedule(err @ ScheduleError::Conflict(_))) = self {
            body["conflictingDays"] = json!(err.conflicting_days());
        }
        HttpResponse::build(status).json(body)
    }
}
