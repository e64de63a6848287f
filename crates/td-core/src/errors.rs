//! Cross-cutting error types for Taskdeck.
//!
//! This module defines errors that can originate from any crate in the system.
//! Storage errors (`DatabaseError`) and configuration errors (`ConfigError`)
//! live in their own crates and convert into `CoreError` at the repository
//! boundary.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by the repository contract and the task service.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The task failed validation; nothing was written.
    #[error("Task validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// The storage backend failed to carry out the operation.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// `NotFound` for a task id.
    #[must_use]
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "task".to_string(),
            id: id.to_string(),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
