//! Task Manager API server
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres` | `redis`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: `PostgreSQL` pool size (default: `10`)
//! - `REDIS_URL`: Redis connection URL (required when `STORAGE_MODE=redis`)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `info`, `task_manager_api=debug`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `5000`)

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use task_manager_api::api::{AppState, create_router};
use task_manager_api::config::ServerConfig;
use task_manager_api::infrastructure::{RepositoryConfig, RepositoryFactory};
use task_manager_api::logging::{SERVER_DEFAULT_FILTER, init_tracing_from_env};
use task_manager_api::store::TaskStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(error) =
        init_tracing_from_env(SERVER_DEFAULT_FILTER, BoxMakeWriter::new(std::io::stdout))
    {
        eprintln!("Configuration error: {error}");
        std::process::exit(1);
    }

    tracing::info!("Starting Task Manager API");

    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let repository_config = match RepositoryConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = %repository_config.storage_mode,
        "Repository configuration loaded"
    );

    let factory = RepositoryFactory::new(repository_config);
    let repository = match factory.create().await {
        Ok(repository) => {
            tracing::info!("Repository initialized successfully");
            repository
        }
        Err(error) => {
            tracing::error!("Failed to initialize repository: {}", error);
            std::process::exit(1);
        }
    };

    let application = create_router(AppState::new(TaskStore::new(repository)));

    let address = server_config.socket_addr();
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %address, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(local) => tracing::info!("Server running on http://{}", local),
        Err(_) => tracing::info!("Server running on http://{}", address),
    }
    tracing::info!("API endpoints available at http://{}/api/tasks", address);

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
