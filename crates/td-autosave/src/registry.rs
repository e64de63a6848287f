//! Tracks which records report to an observer.
//!
//! Attaching goes through the registry so that teardown is deterministic:
//! `detach` and `detach_all` silence exactly the records that were wired up,
//! even if other handles to those records are still alive elsewhere.

use std::collections::HashMap;
use std::sync::Arc;

use td_core::entities::TaskId;

use crate::record::{EditableTask, RecordObserver};

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    attached: HashMap<TaskId, EditableTask>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `record` to `observer`. A record previously registered under
    /// the same id is detached first.
    pub fn attach(&mut self, record: &EditableTask, observer: Arc<dyn RecordObserver>) {
        let id = record.id();
        if let Some(previous) = self.attached.remove(&id) {
            if !previous.ptr_eq(record) {
                previous.detach();
            }
        }
        record.attach(observer);
        self.attached.insert(id, record.clone());
    }

    /// Detach the record registered under `id`; `false` if there was none.
    pub fn detach(&mut self, id: TaskId) -> bool {
        self.attached.remove(&id).is_some_and(|record| {
            record.detach();
            true
        })
    }

    pub fn detach_all(&mut self) {
        for (_, record) in self.attached.drain() {
            record.detach();
        }
    }

    #[must_use]
    pub fn is_attached(&self, id: TaskId) -> bool {
        self.attached.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}
