//! Redis hash backend.
//!
//! Every todo lives in a single hash (default key `VERT_TODO`):
//!
//! - field: the todo id as a decimal string
//! - value: the todo serialized as JSON
//!
//! There are no secondary indexes, so `get_all` is one `HVALS` and its order
//! is whatever Redis returns. Connections come from a `deadpool-redis` pool;
//! each operation borrows one for its duration.

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use ::redis::{AsyncCommands, RedisError};
use todo_core::Todo;

use super::TodoStore;
use crate::config::RedisConfig;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct RedisTodoStore {
    pool: Pool,
    /// Name of the hash holding every todo.
    key: String,
}

impl RedisTodoStore {
    pub fn new(pool: Pool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }

    /// Create the pool without connecting; the first operation dials Redis.
    pub fn from_url(redis_url: &str, key: impl Into<String>) -> StoreResult<Self> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|error| StoreError::Connection(error.to_string()))?;
        Ok(Self::new(pool, key))
    }

    pub fn from_config(config: &RedisConfig) -> StoreResult<Self> {
        Self::from_url(&config.url(), config.key.clone())
    }

    async fn connection(&self) -> StoreResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|error| StoreError::Connection(error.to_string()))
    }

    async fn write(&self, connection: &mut Connection, todo: &Todo) -> StoreResult<()> {
        let json = serde_json::to_string(todo)?;
        let _: () = connection
            .hset(&self.key, todo.id.to_string(), json)
            .await
            .map_err(redis_error)?;
        Ok(())
    }

    async fn read(&self, connection: &mut Connection, id: i64) -> StoreResult<Option<Todo>> {
        let value: Option<String> = connection
            .hget(&self.key, id.to_string())
            .await
            .map_err(redis_error)?;
        Ok(value.map(|json| serde_json::from_str(&json)).transpose()?)
    }
}

fn redis_error(error: RedisError) -> StoreError {
    if error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped() {
        StoreError::Connection(error.to_string())
    } else {
        StoreError::Query(error.to_string())
    }
}

#[async_trait]
impl TodoStore for RedisTodoStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn initialize(&self) -> StoreResult<()> {
        let mut connection = self.connection().await?;
        let _: String = ::redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(redis_error)?;
        Ok(())
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<bool> {
        let mut connection = self.connection().await?;
        self.write(&mut connection, todo).await?;
        Ok(true)
    }

    async fn get_all(&self) -> StoreResult<Vec<Todo>> {
        let mut connection = self.connection().await?;
        let values: Vec<String> = connection.hvals(&self.key).await.map_err(redis_error)?;
        values
            .iter()
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .collect()
    }

    async fn get_one(&self, id: i64) -> StoreResult<Option<Todo>> {
        let mut connection = self.connection().await?;
        self.read(&mut connection, id).await
    }

    async fn update(&self, id: i64, patch: &Todo) -> StoreResult<Option<Todo>> {
        let mut connection = self.connection().await?;
        let Some(current) = self.read(&mut connection, id).await? else {
            return Ok(None);
        };
        let merged = current.merge(patch);
        self.write(&mut connection, &merged).await?;
        Ok(Some(merged))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut connection = self.connection().await?;
        let removed: i64 = connection
            .hdel(&self.key, id.to_string())
            .await
            .map_err(redis_error)?;
        Ok(removed == 1)
    }

    async fn delete_all(&self) -> StoreResult<bool> {
        let mut connection = self.connection().await?;
        let _: i64 = connection.del(&self.key).await.map_err(redis_error)?;
        Ok(true)
    }
}
