use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{TaskPriority, TaskStatus};

/// Repository-assigned task identifier.
pub type TaskId = i64;

/// Identifier carried by a task that has not been persisted yet.
pub const UNSAVED_ID: TaskId = 0;

/// A unit of tracked work.
///
/// `id` and `created_at` are owned by the repository: `add` assigns both and
/// `update` never changes `created_at`. `completion_percentage` and
/// `completed_at` are derived by [`crate::metrics`] from the other fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: String,
    pub category: String,
    pub estimated_hours: i32,
    pub actual_hours: i32,
    pub completion_percentage: f64,
}

impl Task {
    /// An unsaved task with the given title and empty/zero attributes.
    ///
    /// `created_at` is set to now so the value validates; the repository
    /// overwrites it on `add`.
    #[must_use]
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            title: title.into(),
            description: String::new(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            created_at: Utc::now(),
            due_at: None,
            completed_at: None,
            assigned_to: String::new(),
            category: String::new(),
            estimated_hours: 0,
            actual_hours: 0,
            completion_percentage: 0.0,
        }
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Due date has passed and the task is neither completed nor cancelled.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| due < now) && self.status.counts_toward_overdue()
    }
}
