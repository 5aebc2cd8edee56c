//! Todolist Core Library
//!
//! Error taxonomy and port traits that decouple the web layer from a
//! specific storage engine and statistics sink.

// Re-export pure types from todo-types
pub use todo_types::*;

pub mod error;
pub mod ports;

pub use error::{ErrorKind, Result, TodoError};
pub use ports::{StatsSink, TodoStore};
