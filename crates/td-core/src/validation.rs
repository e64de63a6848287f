//! Task validation.
//!
//! A task is acceptable for persistence when it has a non-blank title,
//! non-negative hours, a completion percentage inside `[0, 100]`, and a due
//! date that does not precede its creation date. Validation is pure and never
//! panics; every rejection maps to one [`ValidationError`] variant.

use thiserror::Error;

use crate::entities::Task;

/// The first rule a task violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("estimated hours must not be negative (got {0})")]
    NegativeEstimatedHours(i32),

    #[error("actual hours must not be negative (got {0})")]
    NegativeActualHours(i32),

    #[error("completion percentage must be within 0..=100 (got {0})")]
    CompletionOutOfRange(String),

    #[error("due date precedes creation date")]
    DueBeforeCreated,
}

/// Check `task` against every rule, returning the first violation.
///
/// # Errors
///
/// Returns the [`ValidationError`] for the first failing rule.
pub fn validate(task: &Task) -> Result<(), ValidationError> {
    if task.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if task.estimated_hours < 0 {
        return Err(ValidationError::NegativeEstimatedHours(task.estimated_hours));
    }
    if task.actual_hours < 0 {
        return Err(ValidationError::NegativeActualHours(task.actual_hours));
    }
    // NaN fails the range check as well.
    if !(0.0..=100.0).contains(&task.completion_percentage) {
        return Err(ValidationError::CompletionOutOfRange(
            task.completion_percentage.to_string(),
        ));
    }
    if task.due_at.is_some_and(|due| due < task.created_at) {
        return Err(ValidationError::DueBeforeCreated);
    }
    Ok(())
}

/// Boolean form of [`validate`].
#[must_use]
pub fn is_valid(task: &Task) -> bool {
    validate(task).is_ok()
}
