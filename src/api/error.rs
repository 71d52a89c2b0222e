//! API error handling.
//!
//! Maps store failures and request rejections onto status codes and the
//! failure envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::Envelope;
use crate::domain::{FieldError, ValidationError};
use crate::store::StoreError;

/// Message of every 404 on task routes.
pub const NOT_FOUND_MESSAGE: &str = "Task not found";

/// Message of every 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Generic `error` label on 500 bodies. Internal detail goes to the log only.
pub const INTERNAL_ERROR_LABEL: &str = "Internal server error";

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and envelope body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Failure envelope.
    pub body: Envelope<()>,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, body: Envelope<()>) -> Self {
        Self { status, body }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, Envelope::failure(message))
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            Envelope::failure(message).with_errors(errors),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, Envelope::failure(message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Envelope::failure(INTERNAL_ERROR_MESSAGE).with_error(INTERNAL_ERROR_LABEL),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error(error.message(), error.errors)
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(validation) => validation.into(),
            StoreError::NotFound(_) => Self::not_found(NOT_FOUND_MESSAGE),
            StoreError::StorageUnavailable(cause) => {
                tracing::error!(error = %cause, "Task store operation failed");
                Self::internal_error()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
