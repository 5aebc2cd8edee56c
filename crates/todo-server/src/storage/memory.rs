//! In-memory todo store using DashMap (test double and `memory://` backend)

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use todo_core::{NewTodo, Result, TodoError, TodoItem, TodoPatch, TodoStore};

/// Todo store that keeps every item in process memory
pub struct MemoryTodoStore {
    items: Arc<DashMap<String, TodoItem>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, new: NewTodo) -> Result<TodoItem> {
        new.validate()?;

        let item = TodoItem::new(uuid::Uuid::now_v7().to_string(), new);
        self.items.insert(item.id.clone(), item.clone());

        Ok(item)
    }

    async fn get(&self, id: &str) -> Result<TodoItem> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<TodoItem>> {
        let mut items: Vec<TodoItem> = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(items)
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> Result<TodoItem> {
        patch.validate()?;

        // The shard lock is held for the whole read-modify-write
        let mut entry = self
            .items
            .get_mut(id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        entry.apply(patch);

        Ok(entry.value().clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }
}
