//! The storage contract consumed by the task service.
//!
//! Implemented by `td-db` (`SqlTaskRepository` over libSQL and
//! `InMemoryTaskRepository`). Every method is async and may fail with
//! [`CoreError::Persistence`]; lookups that find nothing return `None` or
//! `false` rather than an error.

use async_trait::async_trait;

use crate::entities::{Task, TaskId};
use crate::enums::{TaskPriority, TaskStatus};
use crate::errors::CoreError;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, highest priority first, then by due date.
    async fn list(&self) -> Result<Vec<Task>, CoreError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, CoreError>;

    /// Insert `task`, assigning its id and stamping `created_at` with now.
    async fn add(&self, task: Task) -> Result<Task, CoreError>;

    /// Overwrite the stored row for `task.id`.
    ///
    /// Never changes the stored `created_at`; sets `completed_at` when the
    /// task is completed and has none. Returns the stored row.
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if no row has `task.id`.
    async fn update(&self, task: Task) -> Result<Task, CoreError>;

    /// Remove the row; `false` if it did not exist.
    async fn delete(&self, id: TaskId) -> Result<bool, CoreError>;

    async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError>;

    async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError>;

    /// Tasks whose assignee contains `assignee`.
    async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError>;

    /// Tasks past their due date that are neither completed nor cancelled.
    async fn overdue(&self) -> Result<Vec<Task>, CoreError>;

    /// Case-insensitive substring search. A blank term lists everything.
    async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError>;
}
