use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::AdapterError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// `context` is the fixed message shown to the client.
    #[error("Storage error ({context}): {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: AdapterError,
    },

    #[error("Request timed out")]
    RequestTimeout,

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn storage(context: &'static str, source: AdapterError) -> Self {
        AppError::Storage { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestTimeout => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage { .. } => "STORAGE_ERROR",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to put in a response body.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Storage { context, .. } => context.to_string(),
            AppError::RequestTimeout => "request timed out".to_string(),
            AppError::InternalServerError(_) => "internal server error".to_string(),
        }
    }

    fn log(&self) {
        let code = self.code();
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => {
                warn!(code, message = %msg, "Client error");
            }
            AppError::Storage { context, source } => {
                error!(code, kind = source.kind(), error = %source, context, "Storage error");
            }
            AppError::RequestTimeout => {
                error!(code, "Request deadline exceeded");
            }
            AppError::InternalServerError(detail) => {
                error!(code, detail = %detail, "Internal server error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal details
        self.log();

        error_response(self.status_code(), self.public_message())
    }
}
