//! Routing definitions for the Task Manager API.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_task, delete_task, get_task, health_check, list_tasks, not_found,
    root_descriptor, update_task,
};

// =============================================================================
// Router Creation
// =============================================================================

/// Creates the application router with all routes and middleware.
///
/// Task routes live under `/api`. Unknown paths, and unknown methods on known
/// paths, answer 404 with the failure envelope.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(TaskStore::in_memory());
/// let router = create_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/tasks",
            get(list_tasks).post(create_task).fallback(not_found),
        )
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(update_task)
                .delete(delete_task)
                .fallback(not_found),
        );

    Router::new()
        .route("/", get(root_descriptor).fallback(not_found))
        .route("/health", get(health_check).fallback(not_found))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

/// Creates the CORS layer configuration.
///
/// The browser client is served from a different origin than the API.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// =============================================================================
// Tests
// =============================================================================
