use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::insights::generator::InsightError;
use crate::profile::validation::FieldError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid onboarding form")]
    InvalidForm(Vec<FieldError>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Insight oracle unavailable")]
    OracleUnavailable,

    #[error("Insight oracle returned a malformed response")]
    MalformedResponse,

    #[error("Profile update failed")]
    UpdateFailed,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::EmptyIndustry => AppError::Validation(err.to_string()),
            InsightError::OracleUnavailable(_) => AppError::OracleUnavailable,
            InsightError::MalformedResponse(_) => AppError::MalformedResponse,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidForm(fields) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "Onboarding form is invalid",
                        "fields": fields,
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::OracleUnavailable => (
                StatusCode::BAD_GATEWAY,
                "ORACLE_UNAVAILABLE",
                "Industry insights are temporarily unavailable".to_string(),
            ),
            AppError::MalformedResponse => (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_RESPONSE",
                "Industry insights could not be generated".to_string(),
            ),
            AppError::UpdateFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPDATE_FAILED",
                "Failed to update profile".to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::NotFound("user".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::OracleUnavailable, StatusCode::BAD_GATEWAY),
            (AppError::MalformedResponse, StatusCode::BAD_GATEWAY),
            (AppError::UpdateFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_insight_errors_map_without_detail() {
        let err: AppError = InsightError::OracleUnavailable(LlmError::EmptyContent).into();
        assert!(matches!(err, AppError::OracleUnavailable));

        let err: AppError = InsightError::MalformedResponse("expected value".into()).into();
        assert!(matches!(err, AppError::MalformedResponse));
        assert!(!err.to_string().contains("expected value"));
    }
}
