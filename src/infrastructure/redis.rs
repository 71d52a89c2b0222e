//! Redis repository implementation.
//!
//! Uses `deadpool-redis` for connection pooling. Documents are JSON strings;
//! writes that touch both the document and the index run as Lua scripts so
//! they are atomic.
//!
//! # Key Design
//!
//! - Task: `task:{task_id}` -> JSON
//! - Task index: `tasks:index` -> ZSET (score = `created_at` millis for ordering)

use deadpool_redis::{Config, Pool, Runtime};
use futures::FutureExt;
use redis::AsyncCommands;

use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::repository::sort_for_listing;
use crate::infrastructure::{RepositoryError, RepositoryFuture, TaskRepository};

// =============================================================================
// Redis Key Constants
// =============================================================================

/// Prefix for task keys.
const TASK_KEY_PREFIX: &str = "task:";

/// Key for the task index (sorted set).
const TASK_INDEX_KEY: &str = "tasks:index";

/// Sets the document and indexes it, unless the key already exists.
/// Returns 1 when written, 0 when the key was taken.
const INSERT_SCRIPT: &str = r"
local key = KEYS[1]
local index_key = KEYS[2]
local document = ARGV[1]
local entity_id = ARGV[2]
local score = tonumber(ARGV[3])

if redis.call('EXISTS', key) == 1 then
    return 0
end

redis.call('SET', key, document)
redis.call('ZADD', index_key, score, entity_id)
return 1
";

/// Overwrites the document only if it exists. Returns 1 when written.
const REPLACE_SCRIPT: &str = r"
local key = KEYS[1]
local document = ARGV[1]

if redis.call('EXISTS', key) == 0 then
    return 0
end

redis.call('SET', key, document)
return 1
";

/// Removes the document and its index entry. Returns 1 = deleted, 0 = not found.
const DELETE_SCRIPT: &str = r"
local key = KEYS[1]
local index_key = KEYS[2]
local entity_id = ARGV[1]

local deleted = redis.call('DEL', key)
if deleted == 1 then
    redis.call('ZREM', index_key, entity_id)
    return 1
end
return 0
";

// =============================================================================
// Helper Functions
// =============================================================================

/// Generates a Redis key for a task.
fn task_key(task_id: &TaskId) -> String {
    format!("{TASK_KEY_PREFIX}{task_id}")
}

/// Converts a timestamp to a score for sorted sets.
///
/// Uses milliseconds since UNIX epoch for ordering.
#[allow(clippy::cast_precision_loss, clippy::missing_const_for_fn)]
fn timestamp_to_score(timestamp: &Timestamp) -> f64 {
    timestamp.as_datetime().timestamp_millis() as f64
}

// =============================================================================
// Redis Task Repository
// =============================================================================

/// Redis implementation of `TaskRepository`.
///
/// # Key Structure
///
/// - `task:{task_id}` -> JSON serialized Task
/// - `tasks:index` -> ZSET with `task_id` as member and `created_at` as score
///
/// # Example
///
/// ```ignore
/// use infrastructure::redis::RedisTaskRepository;
///
/// let repository = RedisTaskRepository::from_url("redis://localhost:6379")?;
/// repository.insert(&task).await?;
/// let found = repository.find_by_id(&task.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RedisTaskRepository {
    /// Connection pool for Redis.
    pool: Pool,
}

impl RedisTaskRepository {
    /// Creates a new Redis task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a new Redis task repository from a Redis URL.
    ///
    /// No connection is made until the first operation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the pool cannot be created.
    pub fn from_url(redis_url: &str) -> Result<Self, RepositoryError> {
        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(RepositoryError::database)?;
        Ok(Self { pool })
    }

    /// Checks that the server answers `PING`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if Redis is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        let mut connection = self.pool.get().await.map_err(RepositoryError::database)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut *connection)
            .await
            .map_err(RepositoryError::database)?;
        Ok(())
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for RedisTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let pool = self.pool.clone();
        let key = task_key(id);
        async move {
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let data: Option<String> = connection
                .get(&key)
                .await
                .map_err(RepositoryError::database)?;

            data.map(|json| serde_json::from_str(&json))
                .transpose()
                .map_err(RepositoryError::serialization)
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let key = task_key(&task.id);
        let task_id_string = task.id.to_string();
        let score = timestamp_to_score(&task.created_at);
        let document = serde_json::to_string(task);

        async move {
            let document = document.map_err(RepositoryError::serialization)?;
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let written: i64 = redis::Script::new(INSERT_SCRIPT)
                .key(&key)
                .key(TASK_INDEX_KEY)
                .arg(&document)
                .arg(&task_id_string)
                .arg(score)
                .invoke_async(&mut *connection)
                .await
                .map_err(RepositoryError::database)?;

            if written == 1 {
                Ok(())
            } else {
                Err(RepositoryError::DuplicateKey(task_id_string))
            }
        }
        .boxed()
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let key = task_key(&task.id);
        let document = serde_json::to_string(task);

        async move {
            let document = document.map_err(RepositoryError::serialization)?;
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let written: i64 = redis::Script::new(REPLACE_SCRIPT)
                .key(&key)
                .arg(&document)
                .invoke_async(&mut *connection)
                .await
                .map_err(RepositoryError::database)?;

            Ok(written == 1)
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let key = task_key(id);
        let task_id_string = id.to_string();

        async move {
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let result: i64 = redis::Script::new(DELETE_SCRIPT)
                .key(&key)
                .key(TASK_INDEX_KEY)
                .arg(&task_id_string)
                .invoke_async(&mut *connection)
                .await
                .map_err(RepositoryError::database)?;

            Ok(result == 1)
        }
        .boxed()
    }

    fn list(&self) -> RepositoryFuture<Vec<Task>> {
        let pool = self.pool.clone();

        async move {
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let task_ids: Vec<String> = connection
                .zrange(TASK_INDEX_KEY, 0, -1)
                .await
                .map_err(RepositoryError::database)?;

            if task_ids.is_empty() {
                return Ok(Vec::new());
            }

            let keys: Vec<String> = task_ids
                .iter()
                .map(|id| format!("{TASK_KEY_PREFIX}{id}"))
                .collect();

            let task_jsons: Vec<Option<String>> = connection
                .mget(&keys)
                .await
                .map_err(RepositoryError::database)?;

            // Index entries whose document vanished between ZRANGE and MGET are skipped.
            let mut tasks = task_jsons
                .into_iter()
                .flatten()
                .map(|json| serde_json::from_str::<Task>(&json))
                .collect::<Result<Vec<_>, _>>()
                .map_err(RepositoryError::serialization)?;

            sort_for_listing(&mut tasks);
            Ok(tasks)
        }
        .boxed()
    }

    fn count(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();

        async move {
            let mut connection = pool.get().await.map_err(RepositoryError::database)?;

            let count: u64 = connection
                .zcard(TASK_INDEX_KEY)
                .await
                .map_err(RepositoryError::database)?;

            Ok(count)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
