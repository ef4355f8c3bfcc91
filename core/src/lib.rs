//! Domain model and storage layer for the to-do API.
//!
//! # Overview
//! A single resource, [`TodoItem`], persisted behind the [`TodoRepository`]
//! trait. Two backends implement it: [`MongoRepository`] for a MongoDB
//! collection and [`MemoryRepository`] for local runs and tests.
//!
//! # Design
//! - The trait carries exactly five operations (list, get, add, delete,
//!   update). Each is one round-trip to the backing store.
//! - Outcomes are explicit values: `Option` for lookups, `bool` for
//!   mutations that may match nothing, `StorageError` for failures.
//! - `dateSaved` is stamped once, inside `add`. Reads never touch it.

pub mod error;
pub mod memory;
pub mod mongo;
pub mod repository;
pub mod types;

pub use error::{StorageError, ValidationError};
pub use memory::MemoryRepository;
pub use mongo::MongoRepository;
pub use repository::{parse_id, SharedRepository, TodoRepository};
pub use types::{NewTodo, TodoChanges, TodoItem, TodoPayload};
