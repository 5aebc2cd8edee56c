//! Todo item types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A persisted todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Build a fresh item from a creation request.
    ///
    /// The timestamp is truncated to microseconds so every backend stores it
    /// without loss.
    pub fn new(id: String, new: NewTodo) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description.filter(|d| !d.is_empty()),
            completed: new.completed.unwrap_or(false),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// Apply a validated patch. Identifier and creation time never change.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Todo creation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        validate_title(&self.title)
    }
}

/// Partial update request
///
/// Absent fields are left untouched; an empty `description` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn validate(&self) -> Result<(), FieldError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// A field constraint violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

impl std::error::Error for FieldError {}

fn validate_title(title: &str) -> Result<(), FieldError> {
    if title.trim().is_empty() {
        return Err(FieldError {
            field: "title",
            reason: "must not be empty",
        });
    }
    Ok(())
}
