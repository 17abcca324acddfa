/// Error types for Blog Service
///
/// Every handler returns [`Result`]; errors are rendered as
/// `{"error": ..., "status": ...}` with a `"fields"` map for validation
/// failures.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::db::RepoError;
use crate::validation::FieldErrors;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    /// One or more fields failed validation
    #[error("Invalid input.")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::NotFound("Not found.".to_string())
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "A server error occurred.",
                    "status": status.as_u16(),
                }))
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "A server error occurred.",
                    "status": status.as_u16(),
                }))
            }
            AppError::Validation(fields) => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
                "fields": fields,
            })),
            AppError::Unauthorized(_) => HttpResponse::build(status)
                .insert_header(("WWW-Authenticate", "Bearer realm=\"api\""))
                .json(serde_json::json!({
                    "error": self.to_string(),
                    "status": status.as_u16(),
                })),
            _ => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            })),
        }
    }
}

impl From<crypto_core::JwtError> for AppError {
    fn from(err: crypto_core::JwtError) -> Self {
        match err {
            crypto_core::JwtError::NotInitialized
            | crypto_core::JwtError::AlreadyInitialized
            | crypto_core::JwtError::InvalidKey(_)
            | crypto_core::JwtError::Encoding(_) => AppError::Internal(err.to_string()),
            _ => AppError::Unauthorized("Token is invalid or expired".to_string()),
        }
    }
}
