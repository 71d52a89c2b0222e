//! HTTP handlers for the Task Manager API.
//!
//! Handlers are stateless: each delegates to the [`TaskStore`] and wraps the
//! outcome in the response envelope.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use super::dto::{ApiDescriptor, Envelope, HealthResponse};
use super::error::ApiErrorResponse;
use super::extract::{TaskPath, TaskPayload};
use crate::domain::{CreateTaskFields, Task, UpdateTaskFields};
use crate::store::TaskStore;

/// Message returned after a successful delete.
pub const DELETED_MESSAGE: &str = "Task deleted successfully";

/// Message of the 404 for unmatched paths and methods.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Task store backed by the configured repository.
    pub store: TaskStore,
}

impl AppState {
    /// Creates a new `AppState` around a store.
    #[must_use]
    pub const fn new(store: TaskStore) -> Self {
        Self { store }
    }
}

// =============================================================================
// Task Handlers
// =============================================================================

/// `GET /api/tasks` - lists every task, oldest first.
///
/// # Errors
///
/// 500 if the store is unavailable.
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Task>>>, ApiErrorResponse> {
    let tasks = state.store.list().await?;
    Ok(Json(Envelope::data(tasks)))
}

/// `GET /api/tasks/{id}` - fetches one task.
///
/// # Errors
///
/// 404 if the id matches no task.
pub async fn get_task(
    State(state): State<AppState>,
    TaskPath(id): TaskPath,
) -> Result<Json<Envelope<Task>>, ApiErrorResponse> {
    let task = state.store.get(&id).await?;
    Ok(Json(Envelope::data(task)))
}

/// `POST /api/tasks` - creates a task.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Buy milk",
///   "description": "Optional description",
///   "status": "pending|in-progress|completed",
///   "priority": "low|medium|high",
///   "dueDate": "2026-10-15"
/// }
/// ```
///
/// # Errors
///
/// 400 on malformed bodies or invalid fields.
pub async fn create_task(
    State(state): State<AppState>,
    TaskPayload(fields): TaskPayload<CreateTaskFields>,
) -> Result<(StatusCode, Json<Envelope<Task>>), ApiErrorResponse> {
    let task = state.store.create(&fields).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(task))))
}

/// `PUT /api/tasks/{id}` - merges the provided fields into a task.
///
/// # Errors
///
/// 404 for an unknown id, 400 on malformed bodies or invalid fields.
pub async fn update_task(
    State(state): State<AppState>,
    TaskPath(id): TaskPath,
    TaskPayload(fields): TaskPayload<UpdateTaskFields>,
) -> Result<Json<Envelope<Task>>, ApiErrorResponse> {
    let task = state.store.update(&id, &fields).await?;
    Ok(Json(Envelope::data(task)))
}

/// `DELETE /api/tasks/{id}` - removes a task permanently.
///
/// # Errors
///
/// 404 if the id matches no task.
pub async fn delete_task(
    State(state): State<AppState>,
    TaskPath(id): TaskPath,
) -> Result<Json<Envelope<()>>, ApiErrorResponse> {
    state.store.delete(&id).await?;
    Ok(Json(Envelope::message(DELETED_MESSAGE)))
}

// =============================================================================
// Informational Handlers
// =============================================================================

/// `GET /` - service descriptor.
pub async fn root_descriptor() -> Json<ApiDescriptor> {
    Json(ApiDescriptor::default())
}

/// `GET /health` - liveness probe.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found(ROUTE_NOT_FOUND_MESSAGE)
}
