//! Storage layer
//!
//! SQLite (embedded) is the durable backend; DashMap backs the in-memory one.
//! Callers only ever see `Arc<dyn TodoStore>`.

pub mod db;
pub mod memory;
#[cfg(test)]
pub mod stalled;

pub use db::SqliteTodoStore;
pub use memory::MemoryTodoStore;
#[cfg(test)]
pub use stalled::StalledStore;

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use todo_core::TodoStore;

/// Build the adapter named by a connection string.
///
/// `memory://` selects the in-memory store, `sqlite:` URLs the SQLite store.
pub async fn open_store(connection: &str, timeout: Duration) -> Result<Arc<dyn TodoStore>> {
    if connection.starts_with("memory:") {
        tracing::warn!("Using in-memory storage, data will not survive a restart");
        let store: Arc<dyn TodoStore> = Arc::new(MemoryTodoStore::new());
        return Ok(store);
    }

    if connection.starts_with("sqlite:") {
        let store: Arc<dyn TodoStore> =
            Arc::new(SqliteTodoStore::connect(connection, timeout).await?);
        return Ok(store);
    }

    bail!("Unsupported storage connection string: {}", connection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_selects_backend() {
        let timeout = Duration::from_secs(1);

        let memory = open_store("memory://", timeout).await.unwrap();
        assert_eq!(memory.name(), "memory");

        let sqlite = open_store("sqlite::memory:", timeout).await.unwrap();
        assert_eq!(sqlite.name(), "sqlite");

        assert!(open_store("mongodb://mongo/todos", timeout).await.is_err());
    }
}
