use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::users::store::StoreError;

/// Failures surfaced by the HTTP layer. Body shapes differ per kind and
/// clients match on them literally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid id `{0}`")]
    InvalidId(String),
    #[error("not found")]
    NotFound,
    #[error("route not found")]
    RouteNotFound,
    #[error("invalid login")]
    InvalidLogin,
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

fn json_message(status: StatusCode, message: &str) -> Response {
    (status, Json(MessageBody { message })).into_response()
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::InvalidId(id) => AppError::InvalidId(id),
            StoreError::NotFound => AppError::NotFound,
            StoreError::Backend(err) => AppError::Internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // validation and malformed ids surface as 500
            AppError::Validation(msg) => {
                warn!(error = %msg, "validation failed");
                json_message(StatusCode::INTERNAL_SERVER_ERROR, &msg)
            }
            AppError::InvalidId(id) => {
                warn!(%id, "malformed id");
                json_message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("invalid id `{id}`"),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found!").into_response(),
            AppError::RouteNotFound => json_message(StatusCode::NOT_FOUND, "Route not found"),
            AppError::InvalidLogin => (StatusCode::FORBIDDEN, "Invalid Login").into_response(),
            AppError::Unauthenticated(reason) => json_message(StatusCode::UNAUTHORIZED, reason),
            AppError::Forbidden => json_message(StatusCode::FORBIDDEN, "Forbidden"),
            AppError::Internal(err) => {
                error!(error = ?err, "internal error");
                json_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
