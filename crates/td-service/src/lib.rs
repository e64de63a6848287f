//! # td-service
//!
//! The task service sits between UI-facing code and a [`TaskRepository`].
//! Writes go through validation and metric normalization first; a task the
//! validator rejects never reaches the repository.
//!
//! The service keeps no state of its own beyond the shared repository handle,
//! so it is cheap to clone into background save tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::errors::CoreError;
use td_core::metrics;
use td_core::repository::TaskRepository;
use td_core::validation::{self, ValidationError};

/// Task count per status. Every status is present, possibly with zero.
pub type Statistics = BTreeMap<TaskStatus, usize>;

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    #[must_use]
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// The repository this service writes through.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repo
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_all(&self) -> Result<Vec<Task>, CoreError> {
        let tasks = self.repo.list().await?;
        tracing::debug!(op = "list_all", count = tasks.len());
        Ok(tasks)
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn get(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        tracing::debug!(op = "get", task_id = id);
        self.repo.get_by_id(id).await
    }

    /// Validate, normalize metrics, then insert.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` if the task is rejected, or a repository failure.
    pub async fn create(&self, task: Task) -> Result<Task, CoreError> {
        self.check("create", &task)?;
        let stored = self.repo.add(metrics::recompute(task)).await?;
        tracing::info!(op = "create", task_id = stored.id, "task created");
        Ok(stored)
    }

    /// Validate, normalize metrics, then overwrite the stored row.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` if the task is rejected, `CoreError::NotFound`
    /// if no row has this id, or a repository failure.
    pub async fn update(&self, task: Task) -> Result<Task, CoreError> {
        self.check("update", &task)?;
        let stored = self.repo.update(metrics::recompute(task)).await?;
        tracing::info!(op = "update", task_id = stored.id, "task updated");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn delete(&self, id: TaskId) -> Result<bool, CoreError> {
        let removed = self.repo.delete(id).await?;
        tracing::info!(op = "delete", task_id = id, removed);
        Ok(removed)
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        tracing::debug!(op = "by_status", %status);
        self.repo.by_status(status).await
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError> {
        tracing::debug!(op = "by_priority", %priority);
        self.repo.by_priority(priority).await
    }

    /// Tasks whose assignee contains `assignee`. A blank value matches nothing
    /// and does not reach the repository.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError> {
        if assignee.trim().is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(op = "by_assignee", assignee);
        self.repo.by_assignee(assignee).await
    }

    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn overdue(&self) -> Result<Vec<Task>, CoreError> {
        tracing::debug!(op = "overdue");
        self.repo.overdue().await
    }

    /// Search by free text; a blank term lists everything.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError> {
        if term.trim().is_empty() {
            return self.list_all().await;
        }
        let tasks = self.repo.search(term).await?;
        tracing::debug!(op = "search", term, count = tasks.len());
        Ok(tasks)
    }

    /// Count of tasks per status over the full list.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn statistics(&self) -> Result<Statistics, CoreError> {
        let mut stats: Statistics = TaskStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for task in self.repo.list().await? {
            *stats.entry(task.status).or_default() += 1;
        }
        Ok(stats)
    }

    /// # Errors
    ///
    /// The first rule the task breaks.
    pub fn validate(&self, task: &Task) -> Result<(), ValidationError> {
        validation::validate(task)
    }

    #[must_use]
    pub fn recompute_metrics(&self, task: Task) -> Task {
        metrics::recompute(task)
    }

    fn check(&self, op: &'static str, task: &Task) -> Result<(), CoreError> {
        self.validate(task).map_err(|error| {
            tracing::warn!(op, task_id = task.id, %error, "task rejected");
            CoreError::Validation(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use td_db::InMemoryTaskRepository;

    use super::*;

    /// Counts writes and reads while delegating to an in-memory store.
    #[derive(Default)]
    struct RecordingRepo {
        inner: InMemoryTaskRepository,
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingRepo {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl TaskRepository for RecordingRepo {
        async fn list(&self) -> Result<Vec<Task>, CoreError> {
            self.record("list");
            self.inner.list().await
        }
        async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
            self.record("get_by_id");
            self.inner.get_by_id(id).await
        }
        async fn add(&self, task: Task) -> Result<Task, CoreError> {
            self.record("add");
            self.inner.add(task).await
        }
        async fn update(&self, task: Task) -> Result<Task, CoreError> {
            self.record("update");
            self.inner.update(task).await
        }
        async fn delete(&self, id: TaskId) -> Result<bool, CoreError> {
            self.record("delete");
            self.inner.delete(id).await
        }
        async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
            self.record("by_status");
            self.inner.by_status(status).await
        }
        async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError> {
            self.record("by_priority");
            self.inner.by_priority(priority).await
        }
        async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError> {
            self.record("by_assignee");
            self.inner.by_assignee(assignee).await
        }
        async fn overdue(&self) -> Result<Vec<Task>, CoreError> {
            self.record("overdue");
            self.inner.overdue().await
        }
        async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError> {
            self.record("search");
            self.inner.search(term).await
        }
    }

    fn service() -> (TaskService, Arc<RecordingRepo>) {
        let repo = Arc::new(RecordingRepo::default());
        (TaskService::new(repo.clone()), repo)
    }

    fn with_status(title: &str, status: TaskStatus) -> Task {
        let mut task = Task::draft(title);
        task.status = status;
        task
    }

    #[rstest]
    #[case::empty_title(Task::draft(""))]
    #[case::negative_estimate(Task { estimated_hours: -5, ..Task::draft("Valid") })]
    #[tokio::test]
    async fn create_rejects_invalid_without_writing(#[case] task: Task) {
        let (svc, repo) = service();

        let err = svc.create(task).await.unwrap_err();

        assert!(err.is_validation());
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn create_normalizes_metrics() {
        let (svc, _repo) = service();
        let mut task = with_status("Build", TaskStatus::InProgress);
        task.estimated_hours = 10;
        task.actual_hours = 5;

        let stored = svc.create(task).await.unwrap();

        assert!(stored.id > 0);
        assert!((stored.completion_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn update_to_completed_sets_completion() {
        let (svc, _repo) = service();
        let mut stored = svc.create(Task::draft("Finish")).await.unwrap();

        stored.status = TaskStatus::Completed;
        let updated = svc.update(stored).await.unwrap();

        assert!((updated.completion_percentage - 100.0).abs() < f64::EPSILON);
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn update_rejects_invalid_without_writing() {
        let (svc, repo) = service();
        let mut stored = svc.create(Task::draft("Keep")).await.unwrap();
        stored.title = "   ".into();

        assert!(svc.update(stored).await.unwrap_err().is_validation());
        assert_eq!(repo.calls(), vec!["add"]);
    }

    #[tokio::test]
    async fn statistics_counts_every_status() {
        let (svc, _repo) = service();
        let statuses = [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Completed,
            TaskStatus::Completed,
        ];
        for (i, status) in statuses.into_iter().enumerate() {
            svc.create(with_status(&format!("task {i}"), status))
                .await
                .unwrap();
        }

        let stats = svc.statistics().await.unwrap();

        assert_eq!(stats.len(), 5);
        assert_eq!(stats[&TaskStatus::NotStarted], 1);
        assert_eq!(stats[&TaskStatus::InProgress], 2);
        assert_eq!(stats[&TaskStatus::Completed], 3);
        assert_eq!(stats[&TaskStatus::Cancelled], 0);
        assert_eq!(stats[&TaskStatus::OnHold], 0);
    }

    #[tokio::test]
    async fn blank_assignee_skips_repository() {
        let (svc, repo) = service();

        assert!(svc.by_assignee("  ").await.unwrap().is_empty());
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_search_lists_all() {
        let (svc, repo) = service();
        svc.create(Task::draft("one")).await.unwrap();
        svc.create(Task::draft("two")).await.unwrap();

        assert_eq!(svc.search("").await.unwrap().len(), 2);
        assert_eq!(repo.calls().last(), Some(&"list"));
    }

    #[tokio::test]
    async fn overdue_includes_open_and_excludes_finished() {
        let (svc, repo) = service();
        let past = Utc::now() - Duration::days(1);

        // Written straight to the store: the validator would reject a due
        // date before the creation time.
        for (title, status) in [
            ("open", TaskStatus::InProgress),
            ("done", TaskStatus::Completed),
            ("dropped", TaskStatus::Cancelled),
        ] {
            let mut task = with_status(title, status);
            task.due_at = Some(past);
            repo.inner.add(task).await.unwrap();
        }

        let overdue = svc.overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "open");
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let (svc, _repo) = service();
        let stored = svc.create(Task::draft("gone")).await.unwrap();

        assert!(svc.delete(stored.id).await.unwrap());
        assert!(!svc.delete(stored.id).await.unwrap());
        assert_eq!(svc.get(stored.id).await.unwrap(), None);
    }
}
