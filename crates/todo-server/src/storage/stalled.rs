//! Store whose every call hangs far past any request timeout

use async_trait::async_trait;
use std::time::Duration;
use todo_core::{NewTodo, Result, TodoError, TodoItem, TodoPatch, TodoStore};

const HANG: Duration = Duration::from_secs(3600);

pub struct StalledStore;

#[async_trait]
impl TodoStore for StalledStore {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn create(&self, _new: NewTodo) -> Result<TodoItem> {
        tokio::time::sleep(HANG).await;
        Err(TodoError::Internal("unreachable".to_string()))
    }

    async fn get(&self, _id: &str) -> Result<TodoItem> {
        tokio::time::sleep(HANG).await;
        Err(TodoError::Internal("unreachable".to_string()))
    }

    async fn list(&self) -> Result<Vec<TodoItem>> {
        tokio::time::sleep(HANG).await;
        Ok(Vec::new())
    }

    async fn update(&self, _id: &str, _patch: TodoPatch) -> Result<TodoItem> {
        tokio::time::sleep(HANG).await;
        Err(TodoError::Internal("unreachable".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        tokio::time::sleep(HANG).await;
        Ok(())
    }
}
