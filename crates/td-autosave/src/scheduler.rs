//! Debounced auto-save.
//!
//! Each task id has at most one pending save. Scheduling again for the same
//! id cancels the pending one and starts a fresh delay, so a burst of edits
//! produces a single save carrying the final state. Once a timer expires and
//! claims its entry, the save runs to completion; cancelling after that point
//! has no effect on it.
//!
//! Saves for one id are serialized through a per-id slot. An expired timer
//! waits for the slot while its entry is still pending, so a later edit can
//! still replace or cancel it, and it snapshots the record only once the
//! previous save has finished.
//!
//! The pending map lives behind a `std::sync::Mutex` that is only held to
//! install, replace or remove an entry, never across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use td_core::entities::TaskId;
use td_service::TaskService;

use crate::events::{CollectionEvent, EventBus};
use crate::lock;
use crate::record::EditableTask;

/// Quiet period used when no configuration is supplied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

struct PendingSave {
    token: CancellationToken,
    generation: u64,
    handle: JoinHandle<()>,
}

impl PendingSave {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

struct SchedulerInner {
    service: TaskService,
    events: EventBus,
    delay: Duration,
    pending: Mutex<HashMap<TaskId, PendingSave>>,
    slots: Mutex<HashMap<TaskId, Arc<AsyncMutex<()>>>>,
    next_generation: AtomicU64,
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Cloneable handle; clones share one pending map.
#[derive(Clone)]
pub struct AutoSaveScheduler {
    inner: Arc<SchedulerInner>,
}

impl AutoSaveScheduler {
    #[must_use]
    pub fn new(service: TaskService, events: EventBus, delay: Duration) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                service,
                events,
                delay,
                pending: Mutex::new(HashMap::new()),
                slots: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Save `record` once no further edit arrives within the delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, record: EditableTask) {
        let id = record.id();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let mut pending = lock(&self.inner.pending);
        if let Some(previous) = pending.remove(&id) {
            previous.cancel();
        }
        let handle = tokio::spawn(Arc::clone(&self.inner).run_timer(
            record,
            token.clone(),
            generation,
        ));
        pending.insert(
            id,
            PendingSave {
                token,
                generation,
                handle,
            },
        );
        tracing::trace!(task_id = id, generation, "auto-save scheduled");
    }

    /// Drop the pending save for `id`, if any. Returns whether one existed.
    pub fn cancel(&self, id: TaskId) -> bool {
        let removed = lock(&self.inner.pending).remove(&id);
        let existed = removed.is_some_and(|entry| {
            entry.cancel();
            true
        });
        if existed {
            tracing::debug!(task_id = id, "auto-save cancelled");
            self.inner.idle.notify_waiters();
        }
        existed
    }

    /// Drop every pending save.
    pub fn cancel_all(&self) {
        let drained: Vec<PendingSave> = lock(&self.inner.pending)
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        if drained.is_empty() {
            return;
        }
        tracing::debug!(count = drained.len(), "auto-saves cancelled");
        for entry in drained {
            entry.cancel();
        }
        self.inner.idle.notify_waiters();
    }

    /// Saves not yet started: waiting for their delay, or for an earlier
    /// save of the same task to finish.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        lock(&self.inner.pending).contains_key(&id)
    }

    /// Resolve once nothing is pending and no save is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.inner.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl SchedulerInner {
    fn is_idle(&self) -> bool {
        let pending = lock(&self.pending);
        pending.is_empty() && self.in_flight.load(Ordering::SeqCst) == 0
    }

    async fn run_timer(
        self: Arc<Self>,
        record: EditableTask,
        token: CancellationToken,
        generation: u64,
    ) {
        tokio::select! {
            () = token.cancelled() => return,
            () = tokio::time::sleep(self.delay) => {}
        }

        let id = record.id();
        let slot = self.slot(id);
        let saved = self.claim_and_save(&record, &token, generation, &slot).await;
        self.release_slot(id, &slot);

        if saved {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.idle.notify_waiters();
        }
    }

    /// Wait for the previous save of this id, then claim the pending entry
    /// and save. Returns whether a save ran.
    async fn claim_and_save(
        &self,
        record: &EditableTask,
        token: &CancellationToken,
        generation: u64,
        slot: &AsyncMutex<()>,
    ) -> bool {
        let _guard = tokio::select! {
            () = token.cancelled() => return false,
            guard = slot.lock() => guard,
        };

        let id = record.id();
        {
            let mut pending = lock(&self.pending);
            match pending.get(&id) {
                Some(entry) if entry.generation == generation && !entry.token.is_cancelled() => {
                    pending.remove(&id);
                    self.in_flight.fetch_add(1, Ordering::SeqCst);
                }
                _ => return false,
            }
        }

        self.save(record).await;
        true
    }

    fn slot(&self, id: TaskId) -> Arc<AsyncMutex<()>> {
        Arc::clone(lock(&self.slots).entry(id).or_default())
    }

    /// Forget the slot for `id` once no other timer holds it.
    fn release_slot(&self, id: TaskId, slot: &Arc<AsyncMutex<()>>) {
        let mut slots = lock(&self.slots);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(slot) <= 2 {
            slots.remove(&id);
        }
    }

    async fn save(&self, record: &EditableTask) {
        let (snapshot, revision) = record.snapshot_with_revision();
        let id = snapshot.id;
        let task = self.service.recompute_metrics(snapshot);

        match self.service.update(task).await {
            Ok(saved) => {
                let current = record.mark_saved(revision, &saved);
                tracing::debug!(task_id = id, current, "auto-saved");
                self.events.publish(CollectionEvent::AutoSaved { id });
            }
            Err(error) => {
                tracing::warn!(task_id = id, %error, "auto-save failed");
                self.events.publish(CollectionEvent::AutoSaveFailed {
                    id,
                    error: error.to_string(),
                });
            }
        }
    }
}
