//! SQLite todo store (embedded, no external service required)

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{NewTodo, TodoError, TodoItem, TodoPatch, TodoStore};

const TODO_COLUMNS: &str = "id, title, description, completed, created_at";

pub struct SqliteTodoStore {
    pool: Arc<SqlitePool>,
}

impl SqliteTodoStore {
    /// Open (and migrate) the database named by a `sqlite:` connection string.
    pub async fn connect(url: &str, acquire_timeout: Duration) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", url);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite connection string: {}", url))?
            .create_if_missing(true);
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Every connection to `:memory:` is its own database, so pin a single
        // connection for the lifetime of the pool.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at: {}", url))?;

        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_todos_created ON todos (created_at, id)
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: &str) -> todo_core::Result<Option<TodoItem>> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLUMNS))
                .bind(id)
                .fetch_optional(&*self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(TodoItem::try_from).transpose()
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(&self, new: NewTodo) -> todo_core::Result<TodoItem> {
        new.validate()?;

        let item = TodoItem::new(uuid::Uuid::now_v7().to_string(), new);

        sqlx::query(
            r#"
            INSERT INTO todos (id, title, description, completed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.completed)
        .bind(item.created_at.timestamp_micros())
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(item)
    }

    async fn get(&self, id: &str) -> todo_core::Result<TodoItem> {
        self.fetch(id)
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    async fn list(&self) -> todo_core::Result<Vec<TodoItem>> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM todos ORDER BY created_at ASC, id ASC",
            TODO_COLUMNS
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TodoItem::try_from).collect()
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> todo_core::Result<TodoItem> {
        patch.validate()?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLUMNS))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        let mut item = match row {
            Some(row) => TodoItem::try_from(row)?,
            None => return Err(TodoError::NotFound(id.to_string())),
        };
        item.apply(patch);

        sqlx::query(
            r#"
            UPDATE todos SET title = ?1, description = ?2, completed = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.completed)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(item)
    }

    async fn delete(&self, id: &str) -> todo_core::Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

/// Classify a driver error without leaking its text past a short summary.
fn map_sqlx_error(e: sqlx::Error) -> TodoError {
    match e {
        sqlx::Error::RowNotFound => TodoError::NotFound("row not found".to_string()),
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            tracing::warn!("SQLite backend unavailable: {}", e);
            TodoError::StorageUnavailable("database is unreachable".to_string())
        }
        other => {
            tracing::error!("SQLite query failed: {}", other);
            TodoError::Internal("database operation failed".to_string())
        }
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: i64,
}

impl TryFrom<TodoRow> for TodoItem {
    type Error = TodoError;

    fn try_from(r: TodoRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::<Utc>::from_timestamp_micros(r.created_at).ok_or_else(|| {
            TodoError::Internal(format!("invalid created_at stored for todo {}", r.id))
        })?;

        Ok(TodoItem {
            id: r.id,
            title: r.title,
            description: r.description,
            completed: r.completed,
            created_at,
        })
    }
}
