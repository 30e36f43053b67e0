use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domain::DomainError;

/// Error returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    Domain(DomainError),
    BadRequest(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Domain(e) => match e {
                DomainError::InvalidInput(_) | DomainError::UnsupportedFormat(_) => {
                    StatusCode::BAD_REQUEST
                }
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::LlmError(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Domain(DomainError::IoError(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Domain(e) => e.to_string(),
            AppError::BadRequest(msg) => msg,
        };

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (DomainError::unsupported("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::llm("x"), StatusCode::BAD_GATEWAY),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(AppError::from(error).status(), expected);
        }
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
    }
}
