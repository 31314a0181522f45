//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use economy::{EconomyError, ErrorKind};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// A rejected game action
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// Missing or invalid access token
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Economy(err) => {
                let status = match err.kind() {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Conflict => StatusCode::CONFLICT,
                    ErrorKind::InsufficientResource => StatusCode::PAYMENT_REQUIRED,
                    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                };
                (status, err.code(), err.to_string())
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Database(err) => classify_sqlx_error(err),
        }
    }
}

/// Unique violations are conflicts (e.g. a second active focus session
/// racing past the row lock); everything else is a 500 with a sanitized
/// message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return (
                StatusCode::CONFLICT,
                "CONFLICT",
                "The request conflicts with the current state".to_string(),
            );
        }
    }

    error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_message();

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_economy_errors_map_to_statuses() {
        assert_eq!(
            status_of(EconomyError::MissingTarget("Reset Pass".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EconomyError::UnknownPass("nope".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(EconomyError::SessionAlreadyActive),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EconomyError::InsufficientCredits {
                required: 100.0,
                available: 1.0
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(status_of(EconomyError::NotOwner), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(EconomyError::TaskNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_row_not_found_is_an_internal_error() {
        assert_eq!(
            status_of(sqlx::Error::RowNotFound),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_carries_code() {
        let (_, code, message) =
            ApiError::from(EconomyError::NoActiveSession).status_code_message();
        assert_eq!(code, "NO_ACTIVE_SESSION");
        assert_eq!(message, "No active focus session");
    }
}
