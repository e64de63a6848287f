//! # td-autosave
//!
//! Live editing for Taskdeck:
//!
//! - [`EditableTask`]: a shared handle over one task with a dirty flag that
//!   reports every change to an attached [`RecordObserver`]
//! - [`AutoSaveScheduler`]: one cancellable, debounced save per task id
//! - [`SubscriptionRegistry`]: which records currently report to whom
//! - [`TaskCollection`]: the ordered set of records a UI displays, with
//!   bulk load/search/add/delete and aggregate counts
//!
//! UI code follows the collection through [`CollectionEvent`]s on a
//! broadcast channel.

pub mod collection;
pub mod events;
pub mod record;
pub mod registry;
pub mod scheduler;

pub use collection::{CollectionStats, TaskCollection};
pub use events::{CollectionEvent, EventBus};
pub use record::{EditableTask, RecordObserver, TaskField};
pub use registry::SubscriptionRegistry;
pub use scheduler::{AutoSaveScheduler, DEFAULT_DEBOUNCE};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
