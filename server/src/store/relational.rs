//! Relational backend (`service.type = jdbc`).
//!
//! Uses an sqlx `AnyPool`, so the same statements run against PostgreSQL in
//! production and SQLite in tests. Placeholders are `$n`, which both drivers
//! accept, and `order` is quoted since it is a reserved word. `completed` is
//! stored as `0`/`1` in a `BIGINT` column: the Any driver cannot decode SQLite
//! booleans.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todo (
//!     id        BIGINT PRIMARY KEY,
//!     title     TEXT,
//!     completed BIGINT,
//!     "order"   BIGINT,
//!     url       TEXT
//! );
//! ```

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use todo_core::Todo;

use super::TodoStore;
use crate::error::{StoreError, StoreResult};

const SQL_CREATE: &str = r#"CREATE TABLE IF NOT EXISTS todo (
    id BIGINT PRIMARY KEY,
    title TEXT,
    completed BIGINT,
    "order" BIGINT,
    url TEXT
)"#;

const SQL_UPSERT: &str = r#"INSERT INTO todo (id, title, completed, "order", url)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (id) DO UPDATE SET
    title = excluded.title,
    completed = excluded.completed,
    "order" = excluded."order",
    url = excluded.url"#;

const SQL_QUERY: &str = r#"SELECT id, title, completed, "order", url FROM todo WHERE id = $1"#;
const SQL_QUERY_ALL: &str = r#"SELECT id, title, completed, "order", url FROM todo ORDER BY id"#;
const SQL_UPDATE: &str =
    r#"UPDATE todo SET title = $1, completed = $2, "order" = $3, url = $4 WHERE id = $5"#;
const SQL_DELETE: &str = "DELETE FROM todo WHERE id = $1";
const SQL_DELETE_ALL: &str = "DELETE FROM todo";
const SQL_MAX_ID: &str = "SELECT MAX(id) FROM todo";

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: Option<String>,
    completed: Option<i64>,
    order: Option<i64>,
    url: Option<String>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            completed: row.completed.map(|flag| flag != 0),
            order: row.order,
            url: row.url,
        }
    }
}

fn sql_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(error.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(error.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct RelationalTodoStore {
    pool: AnyPool,
}

impl RelationalTodoStore {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Build a pool that opens connections on first use.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(sql_error)?;
        Ok(Self::new(pool))
    }

    /// Build a pool and open the first connection immediately.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(sql_error)?;
        Ok(Self::new(pool))
    }

    async fn upsert(&self, todo: &Todo) -> StoreResult<u64> {
        let result = sqlx::query(SQL_UPSERT)
            .bind(todo.id)
            .bind(todo.title.clone())
            .bind(todo.completed.map(i64::from))
            .bind(todo.order)
            .bind(todo.url.clone())
            .execute(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(result.rows_affected())
    }

    async fn overwrite(&self, todo: &Todo) -> StoreResult<u64> {
        let result = sqlx::query(SQL_UPDATE)
            .bind(todo.title.clone())
            .bind(todo.completed.map(i64::from))
            .bind(todo.order)
            .bind(todo.url.clone())
            .bind(todo.id)
            .execute(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TodoStore for RelationalTodoStore {
    fn backend_name(&self) -> &'static str {
        "jdbc"
    }

    async fn initialize(&self) -> StoreResult<()> {
        sqlx::query(SQL_CREATE)
            .execute(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(())
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<bool> {
        Ok(self.upsert(todo).await? > 0)
    }

    async fn get_all(&self) -> StoreResult<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(SQL_QUERY_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn get_one(&self, id: i64) -> StoreResult<Option<Todo>> {
        let row: Option<TodoRow> = sqlx::query_as(SQL_QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(row.map(Todo::from))
    }

    async fn update(&self, id: i64, patch: &Todo) -> StoreResult<Option<Todo>> {
        let Some(current) = self.get_one(id).await? else {
            return Ok(None);
        };
        let merged = current.merge(patch);
        if self.overwrite(&merged).await? == 0 {
            // Deleted between the read and the write.
            return Ok(None);
        }
        Ok(Some(merged))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(SQL_DELETE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_all(&self) -> StoreResult<bool> {
        sqlx::query(SQL_DELETE_ALL)
            .execute(&self.pool)
            .await
            .map_err(sql_error)?;
        Ok(true)
    }

    async fn max_id(&self) -> StoreResult<Option<i64>> {
        sqlx::query_scalar(SQL_MAX_ID)
            .fetch_one(&self.pool)
            .await
            .map_err(sql_error)
    }
}
