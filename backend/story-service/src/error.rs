/// Error types for Story Service
///
/// Every failure a story operation can produce maps to exactly one variant here,
/// and every variant maps to exactly one HTTP status.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Result type for story-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input, e.g. empty story content
    #[error("{0}")]
    Validation(String),

    /// Unknown story or user
    #[error("{0}")]
    NotFound(String),

    /// Story is past its expiry time
    #[error("{0}")]
    Expired(String),

    /// Caller is authenticated but not allowed to act on the resource
    #[error("{0}")]
    Forbidden(String),

    /// No credential supplied
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed request (bad path id, broken multipart body)
    #[error("{0}")]
    BadRequest(String),

    /// Persistence failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn story_not_found() -> Self {
        AppError::NotFound("Story not found".into())
    }

    pub fn story_expired() -> Self {
        AppError::Expired("Story has expired".into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Expired(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Storage and internal details stay in the logs.
        let message = match self {
            AppError::Storage(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "message": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
