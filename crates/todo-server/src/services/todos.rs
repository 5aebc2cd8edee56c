//! Todo service: the storage port bounded by a timeout

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{NewTodo, Result, TodoError, TodoItem, TodoPatch, TodoStore};
use tracing::{debug, info};

pub struct TodoService {
    store: Arc<dyn TodoStore>,
    timeout: Duration,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub async fn create(&self, new: NewTodo) -> Result<TodoItem> {
        let item = self.bounded("create", self.store.create(new)).await?;
        info!("Created todo {}", item.id);
        Ok(item)
    }

    pub async fn get(&self, id: &str) -> Result<TodoItem> {
        self.bounded("get", self.store.get(id)).await
    }

    pub async fn list(&self) -> Result<Vec<TodoItem>> {
        self.bounded("list", self.store.list()).await
    }

    pub async fn update(&self, id: &str, patch: TodoPatch) -> Result<TodoItem> {
        debug!("Updating todo {} with {:?}", id, patch);
        self.bounded("update", self.store.update(id, patch)).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.bounded("delete", self.store.delete(id)).await?;
        info!("Deleted todo {}", id);
        Ok(())
    }

    async fn bounded<T>(&self, op: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Storage {} on {} timed out after {:?}",
                    op,
                    self.store.name(),
                    self.timeout
                );
                Err(TodoError::StorageUnavailable(format!(
                    "{} timed out after {}ms",
                    op,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryTodoStore, StalledStore};

    #[tokio::test]
    async fn test_timeout_maps_to_unavailable() {
        let service = TodoService::new(Arc::new(StalledStore), Duration::from_millis(20));

        let err = service.list().await.unwrap_err();
        assert!(matches!(err, TodoError::StorageUnavailable(_)));

        let err = service.get("x").await.unwrap_err();
        assert!(matches!(err, TodoError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_errors_pass_through_verbatim() {
        let service = TodoService::new(Arc::new(MemoryTodoStore::new()), Duration::from_secs(1));
        assert_eq!(service.backend(), "memory");

        let err = service.delete("missing").await.unwrap_err();
        assert_eq!(err, TodoError::NotFound("missing".to_string()));
    }
}
