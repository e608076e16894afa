// ABOUTME: Centralized error taxonomy for the photo service and its HTTP mapping
// ABOUTME: Every failure becomes a structured JSON body with a status code; storage details stay in the logs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::blob::BlobError;

#[derive(Debug)]
pub enum AppError {
    Database(sea_orm::DbErr),
    Blob(BlobError),
    BlobDelete(BlobError),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_)
            | AppError::Blob(_)
            | AppError::BlobDelete(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(err) => write!(f, "Database error: {}", err),
            AppError::Blob(err) => write!(f, "Blob store error: {}", err),
            AppError::BlobDelete(err) => write!(f, "Blob deletion failed: {}", err),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::Database(_) => {
                tracing::error!("Database error: {}", self);
                "Internal server error"
            }
            AppError::Blob(_) => {
                tracing::error!("Blob store error: {}", self);
                "Error storing image file"
            }
            AppError::BlobDelete(_) => {
                tracing::error!("Blob store error: {}", self);
                "Error deleting image file"
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                "Internal server error"
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Rejected credential: {}", msg);
                msg.as_str()
            }
            AppError::Forbidden(msg) => {
                tracing::warn!("Ownership check failed: {}", msg);
                msg.as_str()
            }
            AppError::NotFound(msg) => {
                tracing::info!("Resource not found: {}", msg);
                msg.as_str()
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                msg.as_str()
            }
            AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Oversized upload: {}", msg);
                msg.as_str()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err)
    }
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        AppError::Blob(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        tracing::debug!("Rejected malformed id: {}", err);
        AppError::BadRequest("Invalid id".to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
