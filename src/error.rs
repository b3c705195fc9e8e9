use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::SqlErr;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by a [`Store`](crate::store::Store) or the audit wrapper
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Conflict: {table} already contains '{key}'")]
    Conflict { table: &'static str, key: String },

    #[error("Row not found: {table} #{id}")]
    MissingRow { table: &'static str, id: i64 },

    #[error("Missing primary key for write to {0}")]
    MissingPrimaryKey(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg.clone())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database Error", None)
            }
            AppError::Store(err) => {
                tracing::error!("Store error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Store Error", None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "Validation Error", Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            message: message.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { table, key } => {
                AppError::Conflict(format!("{} already contains '{}'", table, key))
            }
            StoreError::MissingRow { table, id } => {
                AppError::NotFound(format!("{} #{}", table, id))
            }
            StoreError::Database(err) => match err.sql_err() {
                // a concurrent writer won the race for the unique column
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    tracing::warn!("Unique constraint violated: {}", detail);
                    AppError::Conflict("Record already exists".to_string())
                }
                _ => AppError::Database(err),
            },
            other => AppError::Store(other),
        }
    }
}

/// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting Option to AppError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = AppError::NotFound("Role not found".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_not_found("Item not found");
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_store_error_mapping() {
        let conflict = AppError::from(StoreError::Conflict {
            table: "sec_role",
            key: "Admin".to_string(),
        });
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let cancelled = AppError::from(StoreError::OperationCancelled);
        assert_eq!(
            cancelled.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
