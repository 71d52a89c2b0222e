//! Task store: validation, defaults, and identity on top of a repository.
//!
//! The repository only persists documents. The store validates raw fields,
//! assigns ids and timestamps, and turns repository outcomes into typed
//! failures the HTTP layer can map to status codes.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{CreateTaskFields, Task, TaskId, Timestamp, UpdateTaskFields, ValidationError};
use crate::infrastructure::{InMemoryTaskRepository, RepositoryError, TaskRepository};

// =============================================================================
// Store Error
// =============================================================================

/// Failures of a store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No task with this id exists.
    #[error("Task not found: {0}")]
    NotFound(String),

    /// The backend failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),
}

// =============================================================================
// Task Store
// =============================================================================

/// The persistent collection of tasks.
///
/// Cheap to clone; clones share the repository.
#[derive(Clone)]
pub struct TaskStore {
    repository: Arc<dyn TaskRepository + Send + Sync>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskStore")
            .field("repository", &"Arc<dyn TaskRepository>")
            .finish()
    }
}

impl TaskStore {
    /// Creates a store over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates a store over a fresh in-memory repository.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTaskRepository::new()))
    }

    /// Lists every task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the backend fails.
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.repository.list().await?)
    }

    /// Fetches one task.
    ///
    /// An id that does not parse matches no record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such task exists.
    pub async fn get(&self, id: &str) -> Result<Task, StoreError> {
        let task_id = parse_task_id(id)?;
        self.repository
            .find_by_id(&task_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Validates `fields`, applies defaults and persists a new task.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for invalid input.
    pub async fn create(&self, fields: &CreateTaskFields) -> Result<Task, StoreError> {
        let draft = fields.validate()?;
        let task = Task::create(TaskId::generate(), draft, Timestamp::now());

        self.repository.insert(&task).await?;

        tracing::debug!(task_id = %task.id, title = %task.title, "Task created");
        Ok(task)
    }

    /// Merges the provided fields into an existing task.
    ///
    /// Existence is checked before validation, so an unknown id reports
    /// `NotFound` even when the fields are also invalid.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` or `StoreError::Validation`.
    pub async fn update(&self, id: &str, fields: &UpdateTaskFields) -> Result<Task, StoreError> {
        let existing = self.get(id).await?;
        let changes = fields.validate()?;
        let task_id = existing.id.clone();

        let updated = existing.apply(changes, Timestamp::now());

        if !self.repository.replace(&updated).await? {
            // Deleted between the read and the write.
            return Err(StoreError::NotFound(task_id.to_string()));
        }

        tracing::debug!(task_id = %task_id, "Task updated");
        Ok(updated)
    }

    /// Permanently removes a task.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such task exists.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let task_id = parse_task_id(id)?;

        if !self.repository.delete(&task_id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::debug!(task_id = %task_id, "Task deleted");
        Ok(())
    }

    /// Number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the backend fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.repository.count().await?)
    }
}

fn parse_task_id(id: &str) -> Result<TaskId, StoreError> {
    id.parse()
        .map_err(|_| StoreError::NotFound(id.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskStatus};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> TaskStore {
        TaskStore::in_memory()
    }

    fn status_update(status: &str) -> UpdateTaskFields {
        UpdateTaskFields {
            status: Some(status.to_string()),
            ..UpdateTaskFields::default()
        }
    }

    // -------------------------------------------------------------------------
    // Create Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_create_applies_defaults(store: TaskStore) {
        let task = store
            .create(&CreateTaskFields::titled("Buy milk"))
            .await
            .unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[tokio::test]
    async fn test_create_rejects_missing_title(store: TaskStore, #[case] title: Option<&str>) {
        let fields = CreateTaskFields {
            title: title.map(str::to_string),
            ..CreateTaskFields::default()
        };

        let result = store.create(&fields).await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_assigns_fresh_ids(store: TaskStore) {
        let first = store.create(&CreateTaskFields::titled("a")).await.unwrap();
        let second = store.create(&CreateTaskFields::titled("b")).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_returns_created_task(store: TaskStore) {
        let created = store
            .create(&CreateTaskFields::titled("Read"))
            .await
            .unwrap();

        let fetched = store.get(&created.id.to_string()).await.unwrap();

        assert_eq!(fetched, created);
    }

    // -------------------------------------------------------------------------
    // Get / NotFound Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("not-an-id")]
    #[case("507f1f77bcf86cd799439011")]
    #[tokio::test]
    async fn test_get_malformed_id_is_not_found(store: TaskStore, #[case] id: &str) {
        let result = store.get(id).await;
        assert_eq!(result, Err(StoreError::NotFound(id.to_string())));
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_unknown_id_is_not_found(store: TaskStore) {
        let id = TaskId::generate().to_string();
        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(_))));
    }

    // -------------------------------------------------------------------------
    // Update Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_update_keeps_identity_and_unspecified_fields(store: TaskStore) {
        let created = store
            .create(&CreateTaskFields::titled("Buy milk"))
            .await
            .unwrap();

        let updated = store
            .update(&created.id.to_string(), &status_update("completed"))
            .await
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_persists(store: TaskStore) {
        let created = store.create(&CreateTaskFields::titled("x")).await.unwrap();
        let id = created.id.to_string();

        store.update(&id, &status_update("in-progress")).await.unwrap();

        assert_eq!(store.get(&id).await.unwrap().status, TaskStatus::InProgress);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_invalid_status_leaves_task_unchanged(store: TaskStore) {
        let created = store.create(&CreateTaskFields::titled("x")).await.unwrap();
        let id = created.id.to_string();

        let result = store.update(&id, &status_update("done")).await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.get(&id).await.unwrap(), created);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_unknown_id_wins_over_validation(store: TaskStore) {
        let id = TaskId::generate().to_string();

        let result = store.update(&id, &status_update("done")).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    // -------------------------------------------------------------------------
    // Delete / List Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_delete_then_get_is_not_found(store: TaskStore) {
        let created = store.create(&CreateTaskFields::titled("x")).await.unwrap();
        let id = created.id.to_string();

        store.delete(&id).await.unwrap();

        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound(_))));
    }

    #[rstest]
    #[case(5, 0)]
    #[case(5, 2)]
    #[case(3, 3)]
    #[tokio::test]
    async fn test_list_after_creates_and_deletes(
        store: TaskStore,
        #[case] created: usize,
        #[case] deleted: usize,
    ) {
        let mut ids = Vec::new();
        for index in 0..created {
            let task = store
                .create(&CreateTaskFields::titled(format!("task {index}")))
                .await
                .unwrap();
            ids.push(task.id.to_string());
        }
        for id in ids.iter().take(deleted) {
            store.delete(id).await.unwrap();
        }

        let listed = store.list().await.unwrap();

        assert_eq!(listed.len(), created - deleted);
        assert!(
            listed
                .windows(2)
                .all(|pair| pair[0].created_at <= pair[1].created_at)
        );
    }
}
