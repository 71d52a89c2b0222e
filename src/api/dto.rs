//! Response bodies shared by the server and the client.
//!
//! Every task endpoint answers with an [`Envelope`]. The client decodes the
//! same type, so the wire shape is defined once.

use serde::{Deserialize, Serialize};

use crate::domain::FieldError;

// =============================================================================
// Envelope
// =============================================================================

/// Uniform response wrapper: `{success, data?, message?, errors?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload of a successful read or write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-field validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Generic error label for unexpected failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    #[must_use]
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: Vec::new(),
            error: None,
        }
    }

    /// Successful envelope carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: Vec::new(),
            error: None,
        }
    }

    /// Failed envelope with a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }

    /// Adds field-level errors.
    #[must_use]
    pub fn with_errors(self, errors: Vec<FieldError>) -> Self {
        Self { errors, ..self }
    }

    /// Adds a generic error label.
    #[must_use]
    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self
        }
    }
}

// =============================================================================
// Service descriptor
// =============================================================================

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub message: String,
    pub endpoints: EndpointMap,
}

/// Route summary listed by the service descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMap {
    pub get_all_tasks: String,
    pub get_task_by_id: String,
    pub create_task: String,
    pub update_task: String,
    pub delete_task: String,
}

impl Default for ApiDescriptor {
    fn default() -> Self {
        Self {
            message: "Welcome to Task Manager CRUD API".to_string(),
            endpoints: EndpointMap {
                get_all_tasks: "GET /api/tasks".to_string(),
                get_task_by_id: "GET /api/tasks/:id".to_string(),
                create_task: "POST /api/tasks".to_string(),
                update_task: "PUT /api/tasks/:id".to_string(),
                delete_task: "DELETE /api/tasks/:id".to_string(),
            },
        }
    }
}

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

// =============================================================================
// Tests
// =============================================================================
