//! The live, ordered task collection behind a task list UI.
//!
//! Every record in the collection is attached (through the registry) to an
//! observer that forwards field changes to the [`EventBus`] and hands
//! persist-worthy edits to the [`AutoSaveScheduler`]. Reloading, searching
//! or deleting first cancels the affected pending saves and detaches the
//! affected records, so a record that left the collection can never save.

use std::sync::Arc;

use chrono::Utc;

use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::errors::CoreError;
use td_service::TaskService;

use crate::events::{CollectionEvent, EventBus};
use crate::record::{EditableTask, RecordObserver, TaskField};
use crate::registry::SubscriptionRegistry;
use crate::scheduler::AutoSaveScheduler;

/// Aggregate counts over the records currently in the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub in_progress: usize,
}

struct CollectionObserver {
    scheduler: AutoSaveScheduler,
    events: EventBus,
}

impl RecordObserver for CollectionObserver {
    fn on_field_changed(&self, id: TaskId, field: TaskField) {
        self.events
            .publish(CollectionEvent::FieldChanged { id, field });
    }

    fn on_modified(&self, record: &EditableTask) {
        self.scheduler.schedule(record.clone());
    }

    fn on_statistics_changed(&self, _id: TaskId) {
        self.events.publish(CollectionEvent::StatisticsChanged);
    }
}

/// The task a fresh "add" starts from.
fn new_task_template() -> Task {
    let mut task = Task::draft("New Task");
    task.description = "Task description".to_string();
    task.priority = TaskPriority::Medium;
    task.status = TaskStatus::NotStarted;
    task.assigned_to = "Unassigned".to_string();
    task.category = "General".to_string();
    task.estimated_hours = 8;
    task
}

pub struct TaskCollection {
    service: TaskService,
    scheduler: AutoSaveScheduler,
    events: EventBus,
    registry: SubscriptionRegistry,
    observer: Arc<CollectionObserver>,
    records: Vec<EditableTask>,
    selected: Option<TaskId>,
    loading: bool,
    status_message: String,
}

impl TaskCollection {
    /// An empty collection saving through `scheduler` and publishing on `events`.
    #[must_use]
    pub fn new(service: TaskService, scheduler: AutoSaveScheduler, events: EventBus) -> Self {
        let observer = Arc::new(CollectionObserver {
            scheduler: scheduler.clone(),
            events: events.clone(),
        });
        Self {
            service,
            scheduler,
            events,
            registry: SubscriptionRegistry::new(),
            observer,
            records: Vec::new(),
            selected: None,
            loading: false,
            status_message: String::new(),
        }
    }

    /// Replace the contents with every stored task.
    ///
    /// # Errors
    ///
    /// Propagates repository failures, leaving the collection empty.
    pub async fn load_all(&mut self) -> Result<usize, CoreError> {
        self.teardown();
        self.loading = true;
        let result = self.service.list_all().await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                let count = self.fill(tasks);
                self.set_status(format!("Loaded {count} tasks"));
                Ok(count)
            }
            Err(error) => Err(self.fail("load", error)),
        }
    }

    /// Same as [`Self::load_all`].
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn refresh(&mut self) -> Result<usize, CoreError> {
        self.load_all().await
    }

    /// Replace the contents with the tasks matching `term` (all for a blank term).
    ///
    /// # Errors
    ///
    /// Propagates repository failures, leaving the collection empty.
    pub async fn search(&mut self, term: &str) -> Result<usize, CoreError> {
        self.teardown();
        self.loading = true;
        let result = self.service.search(term).await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                let count = self.fill(tasks);
                self.set_status(format!("Found {count} tasks"));
                Ok(count)
            }
            Err(error) => Err(self.fail("search", error)),
        }
    }

    /// Create the default new task, put it first and select it.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn add_task(&mut self) -> Result<EditableTask, CoreError> {
        self.add(new_task_template()).await
    }

    /// Create `task`, put it first and select it.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` if the task is rejected, or a repository failure.
    pub async fn add(&mut self, task: Task) -> Result<EditableTask, CoreError> {
        let stored = match self.service.create(task).await {
            Ok(stored) => stored,
            Err(error) => return Err(self.fail("add", error)),
        };

        let record = EditableTask::new(stored);
        let id = record.id();
        self.registry.attach(&record, self.observer.clone());
        self.records.insert(0, record.clone());
        self.selected = Some(id);

        self.events.publish(CollectionEvent::TaskAdded { id });
        self.events.publish(CollectionEvent::StatisticsChanged);
        self.set_status("Task created".to_string());
        Ok(record)
    }

    /// Delete the task with `id` from storage and, if present, the collection.
    ///
    /// The pending save is cancelled and the record silenced before storage
    /// is touched. If the delete fails the record is wired up again and keeps
    /// its unsaved edits.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn delete(&mut self, id: TaskId) -> Result<bool, CoreError> {
        let had_pending = self.scheduler.cancel(id);
        let was_attached = self.registry.detach(id);

        let removed = match self.service.delete(id).await {
            Ok(removed) => removed,
            Err(error) => {
                self.reattach(id, was_attached);
                return Err(self.fail("delete", error));
            }
        };
        if !removed {
            self.reattach(id, was_attached);
            self.set_status(format!("Task {id} not found"));
            return Ok(false);
        }

        tracing::debug!(task_id = id, had_pending, "task removed from collection");
        self.records.retain(|r| r.id() != id);
        if self.selected == Some(id) {
            self.selected = None;
        }

        self.events.publish(CollectionEvent::TaskRemoved { id });
        self.events.publish(CollectionEvent::StatisticsChanged);
        self.set_status("Task deleted".to_string());
        Ok(true)
    }

    fn reattach(&mut self, id: TaskId, was_attached: bool) {
        if !was_attached {
            return;
        }
        if let Some(record) = self.records.iter().find(|r| r.id() == id) {
            self.registry.attach(record, self.observer.clone());
        }
    }

    #[must_use]
    pub fn stats(&self) -> CollectionStats {
        let now = Utc::now();
        self.records
            .iter()
            .map(EditableTask::snapshot)
            .fold(CollectionStats::default(), |mut stats, task| {
                stats.total += 1;
                stats.completed += usize::from(task.is_completed());
                stats.overdue += usize::from(task.is_overdue(now));
                stats.in_progress += usize::from(task.status == TaskStatus::InProgress);
                stats
            })
    }

    #[must_use]
    pub fn records(&self) -> &[EditableTask] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&EditableTask> {
        self.records.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&EditableTask> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Select the record with `id`, or clear the selection with `None`.
    /// Returns `false` if no such record is in the collection.
    pub fn select(&mut self, id: Option<TaskId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    #[must_use]
    pub const fn scheduler(&self) -> &AutoSaveScheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn service(&self) -> &TaskService {
        &self.service
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.registry.detach_all();
        self.records.clear();
        self.selected = None;
    }

    fn fill(&mut self, tasks: Vec<Task>) -> usize {
        for task in tasks {
            let record = EditableTask::new(task);
            self.registry.attach(&record, self.observer.clone());
            self.records.push(record);
        }
        let count = self.records.len();
        self.events.publish(CollectionEvent::CollectionReset { count });
        self.events.publish(CollectionEvent::StatisticsChanged);
        count
    }

    fn set_status(&mut self, message: String) {
        self.status_message.clone_from(&message);
        self.events.publish(CollectionEvent::StatusMessage(message));
    }

    fn fail(&mut self, operation: &'static str, error: CoreError) -> CoreError {
        tracing::error!(op = operation, %error, "collection operation failed");
        self.events.publish(CollectionEvent::OperationFailed {
            operation,
            error: error.to_string(),
        });
        self.set_status(format!("Error: {error}"));
        error
    }
}

impl Drop for TaskCollection {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
        self.registry.detach_all();
    }
}
