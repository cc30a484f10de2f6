/// Error types for blog-service
///
/// Errors are converted to JSON HTTP responses for API clients. Ownership
/// mismatches on edit and unauthenticated access are not errors: handlers turn
/// those into redirects before an `AppError` is ever built.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unknown group slug, username or post id
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requester may not mutate the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The operation makes no sense for the given arguments (e.g. self-follow)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Missing or invalid session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Submitted data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violated (duplicate slug, username, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when a database error is a PostgreSQL unique violation (23505).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            AppError::Conflict(_) => true,
            _ => false,
        }
    }

    /// True when a database error is a PostgreSQL foreign-key violation (23503).
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation())
    }

    /// A row referenced by a write vanished after it was checked: report it as
    /// NotFound, the same way the in-memory store does.
    pub fn missing_reference(self, what: impl Into<String>) -> AppError {
        if self.is_foreign_key_violation() {
            AppError::NotFound(what.into())
        } else {
            self
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::InvalidOperation(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("group".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PermissionDenied("post".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidOperation("self-follow".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_missing_reference_keeps_other_errors() {
        let err = AppError::from(sqlx::Error::PoolTimedOut).missing_reference("post 3");
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = AppError::Conflict("slug".into()).missing_reference("group 1");
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(!AppError::NotFound("post".into()).is_foreign_key_violation());
    }

    #[test]
    fn test_conflict_counts_as_unique_violation() {
        assert!(AppError::Conflict("slug".into()).is_unique_violation());
        assert!(!AppError::NotFound("slug".into()).is_unique_violation());
    }
}
