use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::types::Envelope;
use crate::db::DbError;

/// Everything a request handler can fail with. Each variant carries its
/// HTTP status code and the exact `data` string clients match on.
#[derive(Debug, thiserror::Error)]
pub enum RecError {
    #[error("that link is already taken in the database")]
    LinkTaken,
    #[error("invalid input")]
    InvalidInput,
    #[error("invalid id")]
    InvalidId,
    #[error("no item with that id")]
    NotFound,
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for RecError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => RecError::NotFound,
            DbError::Conflict(_) => RecError::LinkTaken,
            e @ DbError::Sqlx(_) => RecError::Db(e),
        }
    }
}

impl IntoResponse for RecError {
    fn into_response(self) -> Response {
        let (code, data) = match self {
            RecError::LinkTaken => (
                StatusCode::BAD_REQUEST,
                "that link is already taken in the database",
            ),
            RecError::InvalidInput => (StatusCode::BAD_REQUEST, "invalid input"),
            RecError::InvalidId => (StatusCode::BAD_REQUEST, "invalid id"),
            RecError::NotFound => (StatusCode::NOT_FOUND, "no item with that id"),
            RecError::Db(e) => {
                error!("store fault while handling request: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };
        (code, Json(Envelope::failure(data))).into_response()
    }
}
