//! Notifications published to UI subscribers.

use tokio::sync::broadcast;

use td_core::entities::TaskId;

use crate::record::TaskField;

/// Capacity of the broadcast channel. Slow subscribers lag rather than block.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A displayed property of a record changed.
    FieldChanged { id: TaskId, field: TaskField },
    /// Aggregate counts may have changed.
    StatisticsChanged,
    /// The collection was cleared and refilled with `count` records.
    CollectionReset { count: usize },
    TaskAdded { id: TaskId },
    TaskRemoved { id: TaskId },
    AutoSaved { id: TaskId },
    AutoSaveFailed { id: TaskId, error: String },
    /// A user-initiated collection operation failed.
    OperationFailed { operation: &'static str, error: String },
    StatusMessage(String),
}

/// Cloneable publisher for [`CollectionEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CollectionEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: CollectionEvent) {
        tracing::trace!(?event, "publish");
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
