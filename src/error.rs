use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::db::DbError;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Display)]
pub enum ApiError {
    /// Malformed or inconsistent request parameters. Raised before any
    /// database access.
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Database(DbError),
}

impl std::error::Error for ApiError {}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Database(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) => {
                tracing::debug!(error = %self, "Client error");
                msg.clone()
            }
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                "Internal Server Error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
