//! Repository wrapper that counts updates and can be told to fail or stall.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use td_autosave::{AutoSaveScheduler, EventBus, TaskCollection, DEFAULT_DEBOUNCE};
use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::errors::CoreError;
use td_core::repository::TaskRepository;
use td_db::InMemoryTaskRepository;
use td_service::TaskService;

#[derive(Default)]
pub struct CountingRepo {
    inner: InMemoryTaskRepository,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
    update_delay: Mutex<Duration>,
    delete_delay: Mutex<Duration>,
    fail_deletes: AtomicBool,
    saved: Mutex<Vec<Task>>,
}

impl CountingRepo {
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_updates.store(failing, Ordering::SeqCst);
    }

    pub fn set_update_delay(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = delay;
    }

    pub fn set_delete_delay(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = delay;
    }

    pub fn set_failing_deletes(&self, failing: bool) {
        self.fail_deletes.store(failing, Ordering::SeqCst);
    }

    /// Every task passed to a successful `update`, in order.
    pub fn saved(&self) -> Vec<Task> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskRepository for CountingRepo {
    async fn list(&self) -> Result<Vec<Task>, CoreError> {
        self.inner.list().await
    }
    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        self.inner.get_by_id(id).await
    }
    async fn add(&self, task: Task) -> Result<Task, CoreError> {
        self.inner.add(task).await
    }
    async fn update(&self, task: Task) -> Result<Task, CoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let delay = *self.update_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CoreError::Persistence("disk full".into()));
        }
        let stored = self.inner.update(task).await?;
        self.saved.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
    async fn delete(&self, id: TaskId) -> Result<bool, CoreError> {
        let delay = *self.delete_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CoreError::Persistence("database is locked".into()));
        }
        self.inner.delete(id).await
    }
    async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        self.inner.by_status(status).await
    }
    async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError> {
        self.inner.by_priority(priority).await
    }
    async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError> {
        self.inner.by_assignee(assignee).await
    }
    async fn overdue(&self) -> Result<Vec<Task>, CoreError> {
        self.inner.overdue().await
    }
    async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError> {
        self.inner.search(term).await
    }
}

pub struct Harness {
    pub repo: Arc<CountingRepo>,
    pub service: TaskService,
    pub events: EventBus,
    pub collection: TaskCollection,
}

/// A collection over a counting repository already holding `titles`, loaded.
pub async fn harness(titles: &[&str]) -> Harness {
    let repo = Arc::new(CountingRepo::default());
    let service = TaskService::new(repo.clone());
    for title in titles {
        service.create(Task::draft(*title)).await.unwrap();
    }

    let events = EventBus::new();
    let scheduler = AutoSaveScheduler::new(service.clone(), events.clone(), DEFAULT_DEBOUNCE);
    let mut collection = TaskCollection::new(service.clone(), scheduler, events.clone());
    collection.load_all().await.unwrap();

    Harness {
        repo,
        service,
        events,
        collection,
    }
}
