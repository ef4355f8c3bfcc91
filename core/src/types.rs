//! Domain types for the to-do API.
//!
//! # Design
//! `TodoItem` is what the store holds and what the API returns. Request
//! bodies arrive as `TodoPayload`, which is deliberately loose (every field
//! optional) so that a missing `task` surfaces as a `ValidationError` rather
//! than a deserialization failure. Validation then produces either a
//! `NewTodo` (create) or `TodoChanges` (update).

use chrono::{DateTime, Datelike, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single to-do item as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub task: String,
    pub comment: Option<String>,
    pub done: bool,
    pub date_saved: DateTime<Utc>,
}

/// Request body for create and update. Unknown fields, including `id`, are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_saved: Option<DateTime<Utc>>,
}

impl TodoPayload {
    /// Validate for creation. `done` defaults to false.
    pub fn into_new_todo(self) -> Result<NewTodo, ValidationError> {
        Ok(NewTodo {
            task: required_task(self.task)?,
            comment: self.comment,
            done: self.done.unwrap_or(false),
            date_saved: self.date_saved,
        })
    }

    /// Validate for update. Only `task` and `comment` survive; `done` and
    /// `dateSaved` are dropped.
    pub fn into_changes(self) -> Result<TodoChanges, ValidationError> {
        Ok(TodoChanges {
            task: required_task(self.task)?,
            comment: self.comment,
        })
    }
}

fn required_task(task: Option<String>) -> Result<String, ValidationError> {
    match task {
        None => Err(ValidationError::MissingField("task")),
        Some(task) if task.trim().is_empty() => Err(ValidationError::EmptyField("task")),
        Some(task) => Ok(task),
    }
}

/// A validated item waiting for its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub comment: Option<String>,
    pub done: bool,
    pub date_saved: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            comment: None,
            done: false,
            date_saved: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Assign `id` and stamp `dateSaved`. This is the only place the
    /// timestamp is ever defaulted.
    pub(crate) fn into_item(self, id: String) -> TodoItem {
        TodoItem {
            id,
            task: self.task,
            comment: self.comment,
            done: self.done,
            date_saved: stamp_date_saved(self.date_saved),
        }
    }
}

/// The fields an update may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub task: String,
    pub comment: Option<String>,
}

/// Keep a client-supplied timestamp unless it is absent or a zero value
/// (Unix epoch or year 1); otherwise use now. Truncated to milliseconds, the
/// precision of a BSON datetime.
fn stamp_date_saved(supplied: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match supplied {
        Some(ts) if ts.timestamp() != 0 && ts.year() > 1 => ts.trunc_subsecs(3),
        _ => Utc::now().trunc_subsecs(3),
    }
}
