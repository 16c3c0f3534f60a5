use axum::{Json, extract::rejection::FormRejection, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::tasks::TaskError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("server busy: {0}")]
    Busy(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Busy(_) => "SERVER_BUSY",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(value: TaskError) -> Self {
        match value {
            TaskError::Validation(msg) => ApiError::InvalidRequest(msg),
            TaskError::NotFound(_) => ApiError::NotFound(value.to_string()),
            TaskError::Busy { .. } => ApiError::Busy(value.to_string()),
            TaskError::DuplicateId(_) | TaskError::Download(_) | TaskError::Archive(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(value: FormRejection) -> Self {
        ApiError::InvalidRequest(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_mapping() {
        let cases = [
            (TaskError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (TaskError::NotFound(1), StatusCode::NOT_FOUND),
            (TaskError::Busy { limit: 3 }, StatusCode::SERVICE_UNAVAILABLE),
            (
                TaskError::Archive("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }
}
