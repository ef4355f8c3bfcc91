//! MongoDB backend.
//!
//! # Design
//! Items live in one collection as `TodoDocument`s keyed by `_id: ObjectId`.
//! The collection handle is opened with an acknowledged write concern
//! (`w: 1`), so every insert, update and delete waits for the server's
//! confirmation. The external string id is parsed into an `ObjectId` on
//! every call that takes one.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    options::{CollectionOptions, WriteConcern},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::repository::{parse_id, TodoRepository};
use crate::types::{NewTodo, TodoChanges, TodoItem};

pub const DEFAULT_DATABASE: &str = "nodeToDo";
pub const DEFAULT_COLLECTION: &str = "todos";

/// On-disk shape of an item. Extra fields in stored documents are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    task: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(rename = "dateSaved", default)]
    date_saved: Option<bson::DateTime>,
}

impl TodoDocument {
    fn from_item(id: ObjectId, item: &TodoItem) -> Self {
        Self {
            id,
            task: item.task.clone(),
            comment: item.comment.clone(),
            done: item.done,
            date_saved: Some(bson::DateTime::from_millis(
                item.date_saved.timestamp_millis(),
            )),
        }
    }

    /// Documents written without `dateSaved` report the creation time
    /// embedded in their ObjectId.
    fn into_item(self) -> TodoItem {
        let saved = self.date_saved.unwrap_or_else(|| self.id.timestamp());
        TodoItem {
            id: self.id.to_hex(),
            task: self.task,
            comment: self.comment,
            done: self.done,
            date_saved: DateTime::from_timestamp_millis(saved.timestamp_millis())
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

/// A `TodoRepository` backed by a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoRepository {
    collection: Collection<TodoDocument>,
}

impl MongoRepository {
    /// Connect, select `database`/`collection`, and ping the server so that a
    /// bad connection string fails here rather than on the first request.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
    ) -> Result<Self, StorageError> {
        if uri.trim().is_empty() {
            return Err(StorageError::backend("connection string must not be empty"));
        }

        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database, collection, "connected to MongoDB");
        Ok(Self::from_database(&db, collection))
    }

    /// Wrap a collection of an already-connected database.
    pub fn from_database(db: &Database, collection: &str) -> Self {
        let mut options = CollectionOptions::default();
        options.write_concern = Some(WriteConcern::nodes(1));
        Self {
            collection: db.collection_with_options(collection, options),
        }
    }
}

#[async_trait]
impl TodoRepository for MongoRepository {
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<TodoDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(TodoDocument::into_item).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<TodoItem>, StorageError> {
        let oid = parse_id(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(TodoDocument::into_item))
    }

    async fn add(&self, todo: NewTodo) -> Result<TodoItem, StorageError> {
        let oid = ObjectId::new();
        let item = todo.into_item(oid.to_hex());
        let result = self
            .collection
            .insert_one(TodoDocument::from_item(oid, &item))
            .await?;

        match result.inserted_id {
            Bson::ObjectId(inserted) if inserted == oid => {
                tracing::debug!(id = %item.id, "todo added");
                Ok(item)
            }
            other => {
                tracing::warn!(expected = %oid, inserted = %other, "insert not acknowledged");
                Err(StorageError::not_acknowledged("Could not post todo"))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        tracing::debug!(id, deleted = result.deleted_count, "todo delete");
        Ok(result.deleted_count > 0)
    }

    async fn update(&self, id: &str, changes: TodoChanges) -> Result<bool, StorageError> {
        let oid = parse_id(id)?;
        let update = doc! {
            "$set": {
                "task": changes.task,
                "comment": changes.comment,
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": oid }, update)
            .await?;
        tracing::debug!(
            id,
            matched = result.matched_count,
            modified = result.modified_count,
            "todo update"
        );
        Ok(result.matched_count > 0)
    }
}
