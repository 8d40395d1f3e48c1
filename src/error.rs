use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type covering every failure class the intake pipeline
/// can surface, with a uniform mapping to HTTP responses.
///
/// User-facing messages are deliberately coarse: configuration errors never
/// name the missing key, and validation errors never name the failing
/// field. Dispatch errors are the one exception; their joined per-channel
/// messages are the caller's only signal to retry the whole submission.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Configuration Errors =====
    #[error("configuration error: {0}")]
    Config(String),

    // ===== Authentication Errors =====
    #[error("forbidden")]
    Forbidden,

    // ===== Validation Errors =====
    #[error("validation error: {0}")]
    Validation(String),

    // ===== Dispatch Errors =====
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    // ===== Unknown/Generic Errors =====
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-facing error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) => "Server not configured".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Dispatch(msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Dispatch(_) => "DISPATCH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Authentication failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Log before responding; user_message() already bounds what the
        // client may learn.
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
