//! Storage trait for todo persistence

use crate::Result;
use async_trait::async_trait;
use todo_types::{NewTodo, TodoItem, TodoPatch};

/// Todo store
///
/// Implementations own identifier assignment and uniqueness. Every mutating
/// call is all-or-nothing as observed through subsequent reads.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Persist a new item and return it with its assigned identifier.
    async fn create(&self, new: NewTodo) -> Result<TodoItem>;

    async fn get(&self, id: &str) -> Result<TodoItem>;

    /// All items, ordered by `created_at` then `id` ascending.
    async fn list(&self) -> Result<Vec<TodoItem>>;

    async fn update(&self, id: &str, patch: TodoPatch) -> Result<TodoItem>;

    /// Remove an item. Deleting an absent item fails with `NotFound`.
    async fn delete(&self, id: &str) -> Result<()>;
}
