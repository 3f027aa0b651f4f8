// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notes_common::{ErrorBody, ErrorDetail};
use thiserror::Error;

use crate::auth::password::HashError;
use crate::auth::session::SessionError;
use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// A protected route was hit without a usable session
    #[error("Unauthorized: {0}")]
    Unauthorized(SessionError),

    /// Unknown user or wrong password. The two are never told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing error: {0}")]
    Hash(#[from] HashError),

    /// Failure while minting a session, never a client mistake
    #[error("Session error: {0}")]
    Session(SessionError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidInput(_) | AppError::Hash(HashError::PasswordTooLong { .. }) => {
                StatusCode::BAD_REQUEST
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::DuplicateUsername => "AUTH_003",
            AppError::RateLimitExceeded => "RATE_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Hash(HashError::PasswordTooLong { .. }) => "VAL_002",
            AppError::Hash(_) => "HASH_001",
            AppError::Session(_) => "SESS_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Unauthorized(_) => "Authentication required".to_string(),
            AppError::InvalidCredentials => "Authentication failed".to_string(),
            AppError::DuplicateUsername => "Username already taken".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Hash(HashError::PasswordTooLong { max }) => {
                format!("Password must be at most {max} bytes")
            },
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Hash(_)
            | AppError::Session(_)
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => "An internal server error occurred".to_string(),
        }
    }

    fn is_auth(&self) -> bool {
        matches!(self, AppError::Unauthorized(_) | AppError::InvalidCredentials)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        // Auth failures never carry detail, not even in debug builds
        let message = if cfg!(debug_assertions) && !self.is_auth() {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
