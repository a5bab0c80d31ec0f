use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::comment::service::MAX_COMMENT_LENGTH;
use crate::utils::helpers::service_name;

/// SQLSTATE raised by Postgres on a primary key / unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Post not found: {0}")]
    PostNotFoundError(String),

    #[error("Comments are disabled for post {0}")]
    CommentsDisabledError(String),

    #[error("Comment is too long: {0} characters (maximum {max})", max = MAX_COMMENT_LENGTH)]
    ContentTooLongError(usize),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailableError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl CustomError {
    fn error_code(&self) -> &'static str {
        match self {
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::PostNotFoundError(..) => "POST_NOT_FOUND_ERROR",
            CustomError::CommentsDisabledError(..) => "COMMENTS_DISABLED_ERROR",
            CustomError::ContentTooLongError(..) => "CONTENT_TOO_LONG_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::StorageUnavailableError(..) => "STORAGE_UNAVAILABLE_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<sqlx::Error> for CustomError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CustomError::NotFoundError("Row not found".to_string()),
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                CustomError::ConflictError(db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => CustomError::StorageUnavailableError(err.to_string()),
            _ => CustomError::InternalServerError(err.to_string()),
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::PostNotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::CommentsDisabledError(..) => StatusCode::FORBIDDEN,
            CustomError::ContentTooLongError(..) => StatusCode::BAD_REQUEST,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::StorageUnavailableError(..) => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.error_code(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}
