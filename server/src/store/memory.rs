//! In-process backend.
//!
//! Keeps todos in a `BTreeMap` behind a tokio `RwLock`, so `get_all` returns
//! them in id order. Nothing is persisted and no operation can fail. Used for
//! local development (`SERVICE_TYPE=memory`) and by the HTTP tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use todo_core::Todo;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreResult;

pub type Db = Arc<RwLock<BTreeMap<i64, Todo>>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryTodoStore {
    db: Db,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, todo: &Todo) -> StoreResult<bool> {
        self.db.write().await.insert(todo.id, todo.clone());
        Ok(true)
    }

    async fn get_all(&self) -> StoreResult<Vec<Todo>> {
        Ok(self.db.read().await.values().cloned().collect())
    }

    async fn get_one(&self, id: i64) -> StoreResult<Option<Todo>> {
        Ok(self.db.read().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: &Todo) -> StoreResult<Option<Todo>> {
        let mut todos = self.db.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            *todo = todo.merge(patch);
            todo.clone()
        }))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.db.write().await.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<bool> {
        self.db.write().await.clear();
        Ok(true)
    }

    async fn max_id(&self) -> StoreResult<Option<i64>> {
        Ok(self.db.read().await.keys().next_back().copied())
    }
}
