//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use dto::{ApiDescriptor, Envelope, HealthResponse};
pub use error::ApiErrorResponse;
pub use extract::{TaskPath, TaskPayload};
pub use handlers::{
    AppState, create_task, delete_task, get_task, health_check, list_tasks, not_found,
    root_descriptor, update_task,
};
pub use routes::create_router;
