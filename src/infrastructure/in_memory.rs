//! In-memory repository implementation.
//!
//! Tasks live in a `HashMap` behind `Arc<RwLock<...>>`. Suitable for tests,
//! demos and single-process deployments; nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId};
use crate::infrastructure::repository::sort_for_listing;
use crate::infrastructure::{RepositoryError, RepositoryFuture, TaskRepository};

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```ignore
/// use infrastructure::in_memory::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let task = Task::create(TaskId::generate(), TaskDraft::titled("My Task"), Timestamp::now());
///
/// repository.insert(&task).await?;
/// let found = repository.find_by_id(&task.id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        async move {
            let guard = tasks.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        async move {
            let mut guard = tasks.write().await;
            if guard.contains_key(&task.id) {
                return Err(RepositoryError::DuplicateKey(task.id.to_string()));
            }
            guard.insert(task.id.clone(), task);
            Ok(())
        }
        .boxed()
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<bool> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        async move {
            let mut guard = tasks.write().await;
            match guard.get_mut(&task.id) {
                Some(existing) => {
                    *existing = task;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        async move {
            let mut guard = tasks.write().await;
            Ok(guard.remove(&id).is_some())
        }
        .boxed()
    }

    fn list(&self) -> RepositoryFuture<Vec<Task>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            let mut listed: Vec<Task> = tasks.read().await.values().cloned().collect();
            sort_for_listing(&mut listed);
            Ok(listed)
        }
        .boxed()
    }

    fn count(&self) -> RepositoryFuture<u64> {
        let tasks = Arc::clone(&self.tasks);
        async move { Ok(tasks.read().await.len() as u64) }.boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskChanges, TaskDraft, TaskStatus, Timestamp};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    // -------------------------------------------------------------------------
    // Helper functions for tests
    // -------------------------------------------------------------------------

    fn test_task(title: &str) -> Task {
        Task::create(TaskId::generate(), TaskDraft::titled(title), Timestamp::now())
    }

    fn test_task_at(title: &str, seconds: i64) -> Task {
        let created_at = Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap();
        Task::create(
            TaskId::generate(),
            TaskDraft::titled(title),
            Timestamp::from_datetime(created_at),
        )
    }

    // -------------------------------------------------------------------------
    // InMemoryTaskRepository Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_find_by_id_not_found() {
        let repository = InMemoryTaskRepository::new();

        let result = repository.find_by_id(&TaskId::generate()).await;

        assert!(result.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_insert_and_find() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Test Task");

        repository.insert(&task).await.unwrap();
        let found = repository.find_by_id(&task.id).await.unwrap();

        assert_eq!(found, Some(task));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_insert_duplicate_fails() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Test Task");
        repository.insert(&task).await.unwrap();

        let result = repository.insert(&task).await;

        assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_replace_existing() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Original Title");
        repository.insert(&task).await.unwrap();

        let updated = task.clone().apply(
            TaskChanges {
                status: Some(TaskStatus::Completed),
                ..TaskChanges::default()
            },
            Timestamp::now(),
        );
        let replaced = repository.replace(&updated).await.unwrap();

        assert!(replaced);
        let found = repository.find_by_id(&task.id).await.unwrap().unwrap();
        assert_eq!(found.status, TaskStatus::Completed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_replace_missing_writes_nothing() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Ghost");

        let replaced = repository.replace(&task).await.unwrap();

        assert!(!replaced);
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_delete() {
        let repository = InMemoryTaskRepository::new();
        let task = test_task("Test Task");
        repository.insert(&task).await.unwrap();

        assert!(repository.delete(&task.id).await.unwrap());
        assert!(!repository.delete(&task.id).await.unwrap());
        assert!(repository.find_by_id(&task.id).await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_list_in_creation_order() {
        let repository = InMemoryTaskRepository::new();
        let first = test_task_at("First", 0);
        let second = test_task_at("Second", 5);
        let third = test_task_at("Third", 10);
        for task in [&second, &third, &first] {
            repository.insert(task).await.unwrap();
        }

        let listed = repository.list().await.unwrap();

        let titles: Vec<&str> = listed.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_task_repository_clones_share_storage() {
        let repository = InMemoryTaskRepository::new();
        let clone = repository.clone();

        repository.insert(&test_task("Shared")).await.unwrap();

        assert_eq!(clone.count().await.unwrap(), 1);
    }
}
