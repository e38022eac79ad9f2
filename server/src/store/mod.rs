//! Storage abstraction for todos.
//!
//! [`TodoStore`] is the only persistence surface the handlers see. Three
//! backends implement it:
//!
//! | Backend | Type | Layout |
//! |---------|------|--------|
//! | Redis | [`RedisTodoStore`] | one hash, field = id, value = JSON todo |
//! | Relational | [`RelationalTodoStore`] | table `todo(id, title, completed, "order", url)` |
//! | Memory | [`MemoryTodoStore`] | `BTreeMap` keyed by id |
//!
//! The backend is picked once at startup by [`connect`] and shared as an
//! `Arc<dyn TodoStore>`.

use std::sync::Arc;

use async_trait::async_trait;
use todo_core::Todo;

use crate::config::StoreConfig;
use crate::error::StoreResult;

pub mod memory;
pub mod redis;
pub mod relational;

pub use memory::MemoryTodoStore;
pub use self::redis::RedisTodoStore;
pub use relational::RelationalTodoStore;

/// Persistence contract shared by every backend.
///
/// `Ok(None)` / `Ok(false)` mean the record was absent; `Err` means the
/// backend itself failed. Callers rely on that distinction.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Make the backing store ready: create the schema or check reachability.
    async fn initialize(&self) -> StoreResult<()>;

    /// Store `todo` under its id, replacing any record with the same id.
    async fn insert(&self, todo: &Todo) -> StoreResult<bool>;

    async fn get_all(&self) -> StoreResult<Vec<Todo>>;

    async fn get_one(&self, id: i64) -> StoreResult<Option<Todo>>;

    /// Merge `patch` into the stored record and persist the result.
    ///
    /// Returns `Ok(None)` if no record exists for `id`.
    async fn update(&self, id: i64, patch: &Todo) -> StoreResult<Option<Todo>>;

    /// Remove one record; `Ok(true)` if it existed.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// Remove every record.
    async fn delete_all(&self) -> StoreResult<bool>;

    /// Highest stored id, used to seed the id counter at startup.
    async fn max_id(&self) -> StoreResult<Option<i64>> {
        Ok(self.get_all().await?.iter().map(|todo| todo.id).max())
    }
}

/// Build the backend selected by `config`.
///
/// No I/O happens here beyond opening connection pools; call
/// [`TodoStore::initialize`] to reach the backend.
pub fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn TodoStore>> {
    let store: Arc<dyn TodoStore> = match config {
        StoreConfig::Redis(redis) => Arc::new(RedisTodoStore::from_config(redis)?),
        StoreConfig::Jdbc(jdbc) => Arc::new(RelationalTodoStore::connect_lazy(
            &jdbc.url,
            jdbc.max_connections,
        )?),
        StoreConfig::Memory => Arc::new(MemoryTodoStore::new()),
    };
    tracing::debug!(backend = store.backend_name(), "store created");
    Ok(store)
}
