//! Error types for the todolist service

use thiserror::Error;
use todo_types::FieldError;

pub type Result<T> = std::result::Result<T, TodoError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    StorageUnavailable,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::StorageUnavailable => "StorageUnavailable",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TodoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoError::Validation(_) => ErrorKind::ValidationError,
            TodoError::NotFound(_) => ErrorKind::NotFound,
            TodoError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            TodoError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<FieldError> for TodoError {
    fn from(e: FieldError) -> Self {
        TodoError::Validation(e.to_string())
    }
}
