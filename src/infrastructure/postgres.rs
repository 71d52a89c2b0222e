//! `PostgreSQL` repository implementation.
//!
//! Tasks are stored as JSONB documents using `sqlx` with a connection pool.
//! The listing columns are kept next to the document so ordering does not
//! need to reach into the JSON.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id UUID PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at, id);
//! ```

use futures::FutureExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::domain::{Task, TaskId};
use crate::infrastructure::{RepositoryError, RepositoryFuture, TaskRepository};

/// Statements run by [`PostgresTaskRepository::ensure_schema`].
const SCHEMA_STATEMENTS: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS tasks (\
         id UUID PRIMARY KEY, \
         data JSONB NOT NULL, \
         created_at TIMESTAMPTZ NOT NULL, \
         updated_at TIMESTAMPTZ NOT NULL\
     )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at, id)",
];

fn map_write_error(error: sqlx::Error, task_id: &TaskId) -> RepositoryError {
    match &error {
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
            RepositoryError::DuplicateKey(task_id.to_string())
        }
        _ => RepositoryError::database(error),
    }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use infrastructure::postgres::PostgresTaskRepository;
///
/// let repository = PostgresTaskRepository::connect("postgres://localhost/tasks", 10).await?;
/// repository.ensure_schema().await?;
/// repository.insert(&task).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool of at most `max_connections` to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the connection fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(RepositoryError::database)?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `tasks` table and its index if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(RepositoryError::database)?;
        }
        Ok(())
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let pool = self.pool.clone();
        let task_id = id.clone();

        async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM tasks WHERE id = $1")
                    .bind(task_id.as_uuid())
                    .fetch_optional(&pool)
                    .await
                    .map_err(RepositoryError::database)?;

            row.map(|(data,)| serde_json::from_value(data))
                .transpose()
                .map_err(RepositoryError::serialization)
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let task = task.clone();

        async move {
            let task_data = serde_json::to_value(&task).map_err(RepositoryError::serialization)?;

            sqlx::query(
                "INSERT INTO tasks (id, data, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(task.id.as_uuid())
            .bind(&task_data)
            .bind(task.created_at.as_datetime())
            .bind(task.updated_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(|error| map_write_error(error, &task.id))?;

            Ok(())
        }
        .boxed()
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let task = task.clone();

        async move {
            let task_data = serde_json::to_value(&task).map_err(RepositoryError::serialization)?;

            let result = sqlx::query("UPDATE tasks SET data = $1, updated_at = $2 WHERE id = $3")
                .bind(&task_data)
                .bind(task.updated_at.as_datetime())
                .bind(task.id.as_uuid())
                .execute(&pool)
                .await
                .map_err(RepositoryError::database)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let task_id = id.clone();

        async move {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(task_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(RepositoryError::database)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn list(&self) -> RepositoryFuture<Vec<Task>> {
        let pool = self.pool.clone();

        async move {
            let rows: Vec<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM tasks ORDER BY created_at ASC, id ASC")
                    .fetch_all(&pool)
                    .await
                    .map_err(RepositoryError::database)?;

            rows.into_iter()
                .map(|(data,)| serde_json::from_value(data).map_err(RepositoryError::serialization))
                .collect()
        }
        .boxed()
    }

    fn count(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();

        async move {
            let count_row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
                .fetch_one(&pool)
                .await
                .map_err(RepositoryError::database)?;

            Ok(u64::try_from(count_row.0).unwrap_or_default())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskChanges, TaskDraft, TaskStatus, Timestamp};
    use rstest::rstest;

    fn test_task(title: &str) -> Task {
        Task::create(TaskId::generate(), TaskDraft::titled(title), Timestamp::now())
    }

    async fn connect() -> PostgresTaskRepository {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());
        let repository = PostgresTaskRepository::connect(&database_url, 2)
            .await
            .unwrap();
        repository.ensure_schema().await.unwrap();
        repository
    }

    #[rstest]
    fn test_schema_statements_are_idempotent() {
        for statement in SCHEMA_STATEMENTS {
            assert!(statement.contains("IF NOT EXISTS"), "{statement}");
        }
    }

    #[rstest]
    fn test_map_write_error_non_database_error() {
        let task_id = TaskId::generate();
        let error = map_write_error(sqlx::Error::RowNotFound, &task_id);
        assert!(matches!(error, RepositoryError::DatabaseError(_)));
    }

    // -------------------------------------------------------------------------
    // Integration Tests (require PostgreSQL)
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_insert_and_find() {
        let repository = connect().await;
        let task = test_task("Test Task");

        repository.insert(&task).await.unwrap();
        let found = repository.find_by_id(&task.id).await.unwrap();
        assert_eq!(found.map(|found| found.title), Some("Test Task".to_string()));

        let _ = repository.delete(&task.id).await;
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_insert_duplicate() {
        let repository = connect().await;
        let task = test_task("Test Task");
        repository.insert(&task).await.unwrap();

        let result = repository.insert(&task).await;
        assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));

        let _ = repository.delete(&task.id).await;
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_replace() {
        let repository = connect().await;
        let task = test_task("Original Title");
        repository.insert(&task).await.unwrap();

        let updated = task.clone().apply(
            TaskChanges {
                title: Some("Updated Title".to_string()),
                status: Some(TaskStatus::Completed),
                ..TaskChanges::default()
            },
            Timestamp::now(),
        );
        assert!(repository.replace(&updated).await.unwrap());

        let found = repository.find_by_id(&task.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Updated Title");
        assert_eq!(found.status, TaskStatus::Completed);

        let _ = repository.delete(&task.id).await;
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_replace_missing() {
        let repository = connect().await;
        assert!(!repository.replace(&test_task("Ghost")).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_delete() {
        let repository = connect().await;
        let task = test_task("Test Task");
        repository.insert(&task).await.unwrap();

        assert!(repository.delete(&task.id).await.unwrap());
        assert!(!repository.delete(&task.id).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_postgres_task_repository_list_and_count() {
        let repository = connect().await;
        let before = repository.count().await.unwrap();
        let task = test_task("Listed");
        repository.insert(&task).await.unwrap();

        assert_eq!(repository.count().await.unwrap(), before + 1);
        let listed = repository.list().await.unwrap();
        assert!(listed.iter().any(|listed_task| listed_task.id == task.id));

        let _ = repository.delete(&task.id).await;
    }
}
