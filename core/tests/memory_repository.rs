//! Repository contract exercised against the in-memory backend.

use todo_core::{MemoryRepository, NewTodo, StorageError, TodoChanges, TodoRepository};

const MISSING_ID: &str = "000000000000000000000000";

fn changes(task: &str, comment: Option<&str>) -> TodoChanges {
    TodoChanges {
        task: task.to_string(),
        comment: comment.map(str::to_string),
    }
}

// --- list ---

#[tokio::test]
async fn list_empty() {
    let repo = MemoryRepository::new();
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_every_item() {
    let repo = MemoryRepository::new();
    for task in ["one", "two", "three"] {
        repo.add(NewTodo::new(task)).await.unwrap();
    }

    let mut tasks: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.task)
        .collect();
    tasks.sort();
    assert_eq!(tasks, ["one", "three", "two"]);
}

// --- add / get ---

#[tokio::test]
async fn add_assigns_object_id_and_timestamp() {
    let repo = MemoryRepository::new();
    let added = repo.add(NewTodo::new("Buy milk")).await.unwrap();

    assert_eq!(added.id.len(), 24);
    assert!(added.id.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!added.done);

    let fetched = repo.get(&added.id).await.unwrap().unwrap();
    assert_eq!(fetched, added);
}

#[tokio::test]
async fn get_does_not_restamp_date_saved() {
    let repo = MemoryRepository::new();
    let added = repo.add(NewTodo::new("t")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let fetched = repo.get(&added.id).await.unwrap().unwrap();
    assert_eq!(fetched.date_saved, added.date_saved);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let repo = MemoryRepository::new();
    assert!(repo.get(MISSING_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn get_malformed_id_fails() {
    let repo = MemoryRepository::new();
    let err = repo.get("1001").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidId(id) if id == "1001"));
}

// --- update ---

#[tokio::test]
async fn update_changes_only_task_and_comment() {
    let repo = MemoryRepository::new();
    let added = repo
        .add(NewTodo::new("old").with_done(true))
        .await
        .unwrap();

    let updated = repo
        .update(&added.id, changes("new", Some("note")))
        .await
        .unwrap();
    assert!(updated);

    let fetched = repo.get(&added.id).await.unwrap().unwrap();
    assert_eq!(fetched.task, "new");
    assert_eq!(fetched.comment.as_deref(), Some("note"));
    assert!(fetched.done);
    assert_eq!(fetched.date_saved, added.date_saved);
}

#[tokio::test]
async fn update_clears_comment_when_absent() {
    let repo = MemoryRepository::new();
    let added = repo
        .add(NewTodo::new("t").with_comment("c"))
        .await
        .unwrap();

    assert!(repo.update(&added.id, changes("t", None)).await.unwrap());
    let fetched = repo.get(&added.id).await.unwrap().unwrap();
    assert_eq!(fetched.comment, None);
}

#[tokio::test]
async fn update_missing_returns_false() {
    let repo = MemoryRepository::new();
    assert!(!repo.update(MISSING_ID, changes("t", None)).await.unwrap());
}

// --- delete ---

#[tokio::test]
async fn delete_removes_item() {
    let repo = MemoryRepository::new();
    let added = repo.add(NewTodo::new("t")).await.unwrap();

    assert!(repo.delete(&added.id).await.unwrap());
    assert!(repo.get(&added.id).await.unwrap().is_none());
    assert!(!repo.delete(&added.id).await.unwrap());
}

#[tokio::test]
async fn delete_malformed_id_fails() {
    let repo = MemoryRepository::new();
    assert!(matches!(
        repo.delete("nope").await,
        Err(StorageError::InvalidId(_))
    ));
}

#[tokio::test]
async fn clones_share_storage() {
    let repo = MemoryRepository::new();
    let other = repo.clone();
    let added = repo.add(NewTodo::new("shared")).await.unwrap();
    assert!(other.get(&added.id).await.unwrap().is_some());
}
