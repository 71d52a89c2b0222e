//! Repository factory for runtime backend selection.
//!
//! Picks the document backend from configuration and initializes it.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres` | `redis`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size for `PostgreSQL` (default 10)
//! - `REDIS_URL`: Redis connection URL (required when `STORAGE_MODE=redis`)
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::factory::{RepositoryConfig, RepositoryFactory};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! let task = repository.find_by_id(&task_id).await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{InMemoryTaskRepository, PostgresTaskRepository, RedisTaskRepository, TaskRepository};
use crate::config::{ConfigurationError, read_variable};

/// Default `PostgreSQL` pool size.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Configuration Types
// =============================================================================

/// Backend that holds the task documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local map. Suitable for testing and development.
    #[default]
    InMemory,
    /// `PostgreSQL` JSONB documents.
    Postgres,
    /// Redis JSON documents with a sorted-set index.
    Redis,
}

impl StorageMode {
    /// Returns the canonical configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::Postgres => "postgres",
            Self::Redis => "redis",
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
///
/// Use `RepositoryConfigBuilder` for a fluent API to construct this.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Backend for task documents.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Maximum `PostgreSQL` pool size.
    pub database_max_connections: u32,
    /// Redis connection URL (required when `storage_mode` is `Redis`).
    pub redis_url: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            redis_url: None,
        }
    }
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` or `DATABASE_MAX_CONNECTIONS` contains an invalid value
    /// - the URL required by the selected mode is missing
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| read_variable(&lookup, name);

        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();

        let database_max_connections = read("DATABASE_MAX_CONNECTIONS")
            .map(|value| {
                value
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or(ConfigurationError::InvalidMaxConnections(value))
            })
            .transpose()?
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS);

        let config = Self {
            storage_mode,
            database_url: read("DATABASE_URL"),
            database_max_connections,
            redis_url: read("REDIS_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the URL required by the selected mode is missing.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        match self.storage_mode {
            StorageMode::Postgres if self.database_url.is_none() => {
                Err(ConfigurationError::MissingDatabaseUrl)
            }
            StorageMode::Redis if self.redis_url.is_none() => {
                Err(ConfigurationError::MissingRedisUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/tasks")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    config: RepositoryConfig,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.config.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Sets the `PostgreSQL` pool size.
    #[must_use]
    pub const fn database_max_connections(mut self, size: u32) -> Self {
        self.config.database_max_connections = size;
        self
    }

    /// Sets the Redis URL.
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Redis connection error.
    #[error("Redis connection error: {0}")]
    RedisConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the task repository based on configuration.
///
/// # Example
///
/// ```ignore
/// let factory = RepositoryFactory::from_env()?;
/// let repository = factory.create().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository for the configured storage mode.
    ///
    /// `PostgreSQL` gets its schema ensured; Redis is pinged so a bad URL
    /// fails here rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the backend cannot be reached.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository + Send + Sync>, FactoryError> {
        tracing::info!(storage_mode = %self.config.storage_mode, "Initializing task repository");

        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryTaskRepository::new())),
            StorageMode::Postgres => Ok(Arc::new(self.create_postgres_repository().await?)),
            StorageMode::Redis => Ok(Arc::new(self.create_redis_repository().await?)),
        }
    }

    /// Connects to `PostgreSQL` and creates the schema if missing.
    async fn create_postgres_repository(&self) -> Result<PostgresTaskRepository, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        let repository =
            PostgresTaskRepository::connect(database_url, self.config.database_max_connections)
                .await
                .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        repository
            .ensure_schema()
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        Ok(repository)
    }

    /// Creates the Redis pool and checks the server is reachable.
    async fn create_redis_repository(&self) -> Result<RedisTaskRepository, FactoryError> {
        let redis_url = self
            .config
            .redis_url
            .as_ref()
            .ok_or(ConfigurationError::MissingRedisUrl)?;

        let repository = RedisTaskRepository::from_url(redis_url)
            .map_err(|error| FactoryError::RedisConnection(error.to_string()))?;

        repository
            .ping()
            .await
            .map_err(|error| FactoryError::RedisConnection(error.to_string()))?;

        Ok(repository)
    }
}

// =============================================================================
// Tests
// =============================================================================
