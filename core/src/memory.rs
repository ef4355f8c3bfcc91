//! In-memory backend.
//!
//! Holds items in a `HashMap` behind a tokio `RwLock`. Ids are generated as
//! ObjectIds so they look and parse exactly like the MongoDB backend's.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::repository::{parse_id, TodoRepository};
use crate::types::{NewTodo, TodoChanges, TodoItem};

pub type Db = Arc<RwLock<HashMap<ObjectId, TodoItem>>>;

/// A `TodoRepository` that lives and dies with the process. Clones share the
/// same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    db: Db,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
        let todos = self.db.read().await;
        Ok(todos.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<TodoItem>, StorageError> {
        let oid = parse_id(id)?;
        let todos = self.db.read().await;
        Ok(todos.get(&oid).cloned())
    }

    async fn add(&self, todo: NewTodo) -> Result<TodoItem, StorageError> {
        let oid = ObjectId::new();
        let item = todo.into_item(oid.to_hex());
        self.db.write().await.insert(oid, item.clone());
        tracing::debug!(id = %item.id, "todo added");
        Ok(item)
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let oid = parse_id(id)?;
        let removed = self.db.write().await.remove(&oid).is_some();
        tracing::debug!(id, removed, "todo delete");
        Ok(removed)
    }

    async fn update(&self, id: &str, changes: TodoChanges) -> Result<bool, StorageError> {
        let oid = parse_id(id)?;
        let mut todos = self.db.write().await;
        let Some(todo) = todos.get_mut(&oid) else {
            return Ok(false);
        };
        todo.task = changes.task;
        todo.comment = changes.comment;
        tracing::debug!(id, "todo updated");
        Ok(true)
    }
}
