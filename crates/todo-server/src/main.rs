//! Todolist Server
//!
//! A small web API over a pluggable todo store, with request statistics
//! aggregated over a rolling window and logged once per window.

mod config;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use todo_core::TodoStore;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use config::Config;
use services::{LogSink, StatisticsAccumulator, TodoService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
    pub stats: Arc<StatisticsAccumulator>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let config = Config::parse();

    println!("{}", config.summary());

    match config.init_logging() {
        Ok(true) => {}
        Ok(false) => warn!("error setting log level, using debug as default"),
        Err(e) => {
            eprintln!("[FATAL] Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    }

    info!("Starting todolist server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(&config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: &Config) -> Result<()> {
    info!("Opening storage...");
    let store = storage::open_store(&config.db, config.storage_timeout)
        .await
        .context("Failed to open storage")?;
    info!("Storage backend: {}", store.name());

    let todos = Arc::new(TodoService::new(store, config.storage_timeout));
    let stats = Arc::new(StatisticsAccumulator::new(config.stats_duration));
    let flush_tasks = stats.spawn(Arc::new(LogSink));
    info!("Statistics window: {:?}", stats.duration());

    let app = build_router(AppState { todos, stats });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped, flushing statistics");
    flush_tasks.shutdown().await;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats::current))
        .route(
            "/todos",
            get(handlers::todos::list).post(handlers::todos::create),
        )
        .route(
            "/todos/:id",
            get(handlers::todos::get)
                .put(handlers::todos::update)
                .patch(handlers::todos::update)
                .delete(handlers::todos::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
