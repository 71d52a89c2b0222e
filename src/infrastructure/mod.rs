//! Infrastructure module for external services.
//!
//! This module contains the document repositories and the factory that
//! selects one at start-up.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod redis;
pub mod repository;

pub use factory::{
    FactoryError, RepositoryConfig, RepositoryConfigBuilder, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use redis::RedisTaskRepository;
pub use repository::{RepositoryError, RepositoryFuture, TaskRepository};
