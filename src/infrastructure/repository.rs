//! Repository trait for task documents.
//!
//! Every backend stores whole task documents keyed by id. Operations return
//! boxed `'static` futures so a repository can sit behind
//! `Arc<dyn TaskRepository + Send + Sync>` and be shared across handlers.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Task, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A document with the same id already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Database or connection error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RepositoryError {
    /// Wraps a database driver error.
    pub fn database(error: impl std::fmt::Display) -> Self {
        Self::DatabaseError(error.to_string())
    }

    /// Wraps a serialization error.
    pub fn serialization(error: impl std::fmt::Display) -> Self {
        Self::SerializationError(error.to_string())
    }
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Task Repository
// =============================================================================

/// Document store for tasks.
///
/// Implementations must be safe to call concurrently. A read never observes
/// a partially written document.
pub trait TaskRepository: Send + Sync {
    /// Finds a task by its ID.
    ///
    /// Returns `Ok(Some(task))` if found, `Ok(None)` if not found,
    /// or an error if the operation fails.
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;

    /// Inserts a new task.
    ///
    /// Fails with [`RepositoryError::DuplicateKey`] if the id is taken.
    fn insert(&self, task: &Task) -> RepositoryFuture<()>;

    /// Replaces an existing task document.
    ///
    /// Returns `Ok(false)` if no task with that id exists; nothing is written.
    fn replace(&self, task: &Task) -> RepositoryFuture<bool>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool>;

    /// Lists every task, oldest `created_at` first, ties broken by id.
    fn list(&self) -> RepositoryFuture<Vec<Task>>;

    /// Counts all tasks.
    fn count(&self) -> RepositoryFuture<u64>;
}

/// Sorts tasks into listing order: `created_at` ascending, then id.
pub fn sort_for_listing(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.created_at
            .cmp(&right.created_at)
            .then_with(|| left.id.cmp(&right.id))
    });
}

// =============================================================================
// Tests
// =============================================================================
