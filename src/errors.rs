use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure talking to something outside the process: the AI provider, the
/// database, the identity backend.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unexpected payload from {service}: {detail}")]
    Payload { service: &'static str, detail: String },
}

/// User-supplied input the service refuses to act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

pub const RETRY_MESSAGE: &str = "Service temporarily unavailable, please try again.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::Transport(e) => {
                error!(error = %e, "transport failure");
                (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string())
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_hide_details_behind_retry_message() {
        let err = AppError::from(TransportError::Status {
            service: "gemini",
            status: 503,
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let res = AppError::Validation("query must not be empty".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
