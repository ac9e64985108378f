//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind};
use crate::repository::RepositoryError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", what, id))
    }

    /// Domain error carried by this error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn domain_status(err: &DomainError) -> StatusCode {
    match (err.kind(), err) {
        (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
        (ErrorKind::InvalidTransition, DomainError::Overpayment { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        (ErrorKind::InvalidTransition, _) => StatusCode::CONFLICT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, "not_found", Some(what.clone())),

            // 400 / 409 / 422 depending on the rule that was broken
            AppError::Domain(domain_err) => (
                domain_status(domain_err),
                domain_err.code(),
                Some(domain_err.to_string()),
            ),

            AppError::Repository(e @ RepositoryError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "not_found", Some(e.to_string()))
            }
            AppError::Repository(e @ RepositoryError::Conflict(_)) => {
                (StatusCode::CONFLICT, "conflict", Some(e.to_string()))
            }

            // 500 Internal Server Error
            AppError::Repository(e) => {
                tracing::error!("Repository error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "repository_error", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_domain_error_status_mapping() {
        assert_eq!(
            status_of(DomainError::InvalidAmount("0".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::overpayment(dec!(10), dec!(5)).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::AlreadyPaid { valor_pago: dec!(1) }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::AlreadyCancelled.into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_infrastructure_errors_are_500() {
        assert_eq!(
            status_of(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RepositoryError::CorruptedRow("status".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_lookup_errors_are_client_errors() {
        let missing = RepositoryError::NotFound {
            entidade: "ContaPagar",
            id: uuid::Uuid::new_v4(),
        };
        assert_eq!(status_of(missing.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(RepositoryError::Conflict("duplicate".into()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("conta_pagar", uuid::Uuid::nil());
        assert!(err.to_string().contains("conta_pagar"));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
