//! Process-local task store.
//!
//! Mirrors the ordering rules of the SQL repository. Search here only looks
//! at title and description.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::errors::CoreError;
use td_core::repository::TaskRepository;

#[derive(Debug, Default)]
struct Store {
    tasks: BTreeMap<TaskId, Task>,
    last_id: TaskId,
}

/// [`TaskRepository`] holding tasks in memory. Ids start at 1.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    store: RwLock<Store>,
}

fn by_priority_desc(a: &Task, b: &Task) -> Ordering {
    b.priority.cmp(&a.priority)
}

fn by_due_asc(a: &Task, b: &Task) -> Ordering {
    a.due_at.cmp(&b.due_at)
}

impl InMemoryTaskRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F, O>(&self, keep: F, order: O) -> Vec<Task>
    where
        F: Fn(&Task) -> bool + Send,
        O: Fn(&Task, &Task) -> Ordering + Send,
    {
        let store = self.store.read().await;
        let mut tasks: Vec<Task> = store.tasks.values().filter(|t| keep(t)).cloned().collect();
        // Stable sort keeps id order among ties.
        tasks.sort_by(|a, b| order(a, b));
        tasks
    }
}

fn stamp_completion(task: &mut Task) {
    if task.status == TaskStatus::Completed && task.completed_at.is_none() {
        task.completed_at = Some(Utc::now());
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .select(|_| true, |a, b| by_priority_desc(a, b).then_with(|| by_due_asc(a, b)))
            .await)
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        Ok(self.store.read().await.tasks.get(&id).cloned())
    }

    async fn add(&self, mut task: Task) -> Result<Task, CoreError> {
        let mut store = self.store.write().await;
        store.last_id += 1;
        task.id = store.last_id;
        task.created_at = Utc::now();
        stamp_completion(&mut task);
        store.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, mut task: Task) -> Result<Task, CoreError> {
        let mut store = self.store.write().await;
        let Some(existing) = store.tasks.get_mut(&task.id) else {
            return Err(CoreError::task_not_found(task.id));
        };
        task.created_at = existing.created_at;
        stamp_completion(&mut task);
        *existing = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> Result<bool, CoreError> {
        Ok(self.store.write().await.tasks.remove(&id).is_some())
    }

    async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        Ok(self.select(|t| t.status == status, by_priority_desc).await)
    }

    async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError> {
        Ok(self.select(|t| t.priority == priority, by_due_asc).await)
    }

    async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .select(|t| t.assigned_to.contains(assignee), by_priority_desc)
            .await)
    }

    async fn overdue(&self) -> Result<Vec<Task>, CoreError> {
        let now = Utc::now();
        Ok(self.select(|t| t.is_overdue(now), by_priority_desc).await)
    }

    async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.list().await;
        }
        Ok(self
            .select(
                |t| {
                    t.title.to_lowercase().contains(&term)
                        || t.description.to_lowercase().contains(&term)
                },
                by_priority_desc,
            )
            .await)
    }
}
