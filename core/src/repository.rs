//! The storage interface every backend implements.

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::StorageError;
use crate::types::{NewTodo, TodoChanges, TodoItem};

/// Storage for to-do items. Implementations must be thread-safe; the HTTP
/// layer shares one instance across all requests as a [`SharedRepository`].
///
/// Identifiers are 24-character hex ObjectIds. A malformed identifier fails
/// the call with [`StorageError::InvalidId`].
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Every stored item, in no particular order.
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError>;

    /// Returns `None` if no item has this id.
    async fn get(&self, id: &str) -> Result<Option<TodoItem>, StorageError>;

    /// Persist a new item and return it with `id` and `dateSaved` filled in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotAcknowledged` if the store did not confirm
    /// the write.
    async fn add(&self, todo: NewTodo) -> Result<TodoItem, StorageError>;

    /// Returns `true` if the store removed an item, `false` if nothing was
    /// removed.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Set `task` and `comment` on the matching item. Returns `true` iff an
    /// item matched.
    async fn update(&self, id: &str, changes: TodoChanges) -> Result<bool, StorageError>;
}

pub type SharedRepository = Arc<dyn TodoRepository>;

/// Parse an external id into the store's native identifier.
pub fn parse_id(id: &str) -> Result<ObjectId, StorageError> {
    ObjectId::parse_str(id).map_err(|_| StorageError::InvalidId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_hex_object_id() {
        let oid = parse_id("540c0a559bcc7b4034000002").unwrap();
        assert_eq!(oid.to_hex(), "540c0a559bcc7b4034000002");
    }

    #[test]
    fn parse_id_rejects_malformed_input() {
        for bad in ["", "1", "not-an-id", "540c0a559bcc7b403400000z"] {
            match parse_id(bad) {
                Err(StorageError::InvalidId(raw)) => assert_eq!(raw, bad),
                other => panic!("expected InvalidId for {bad:?}, got {other:?}"),
            }
        }
    }
}
