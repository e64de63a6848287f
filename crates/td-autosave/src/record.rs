//! Observable, mutable task record.
//!
//! An [`EditableTask`] is a cheap handle (clones share state) around one
//! task plus a dirty flag and an edit revision. Setters compare against the
//! current value and do nothing when it is unchanged. A real change bumps the
//! revision, marks the record dirty, and notifies the attached observer:
//!
//! 1. `on_field_changed` for the edited field and any derived ones
//! 2. `on_field_changed(IsDirty)` on the clean -> dirty transition only
//! 3. `on_statistics_changed` when status or due date changed
//! 4. `on_modified` on every edit, so a pending save restarts its delay
//!
//! Observers are called on the editing thread after the state lock is
//! released, so they may read the record back.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::metrics::{COMPLETE, NOT_STARTED};

use crate::lock;

/// Percentage a task jumps to when it starts, if it was at either end.
const STARTED: f64 = 50.0;

/// Properties a UI may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Title,
    Description,
    Priority,
    Status,
    DueAt,
    AssignedTo,
    Category,
    EstimatedHours,
    ActualHours,
    CompletionPercentage,
    CompletedAt,
    IsCompleted,
    IsOverdue,
    IsDirty,
}

impl TaskField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::DueAt => "due_at",
            Self::AssignedTo => "assigned_to",
            Self::Category => "category",
            Self::EstimatedHours => "estimated_hours",
            Self::ActualHours => "actual_hours",
            Self::CompletionPercentage => "completion_percentage",
            Self::CompletedAt => "completed_at",
            Self::IsCompleted => "is_completed",
            Self::IsOverdue => "is_overdue",
            Self::IsDirty => "is_dirty",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives change notifications from an attached record.
pub trait RecordObserver: Send + Sync {
    fn on_field_changed(&self, id: TaskId, field: TaskField);

    /// A persist-worthy edit happened; a save should be (re)scheduled.
    fn on_modified(&self, record: &EditableTask);

    fn on_statistics_changed(&self, id: TaskId);
}

#[derive(Debug)]
struct RecordState {
    task: Task,
    dirty: bool,
    revision: u64,
}

struct Inner {
    state: Mutex<RecordState>,
    observer: Mutex<Option<Arc<dyn RecordObserver>>>,
}

/// Shared handle over one live task.
#[derive(Clone)]
pub struct EditableTask {
    inner: Arc<Inner>,
}

impl fmt::Debug for EditableTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("EditableTask")
            .field("id", &state.task.id)
            .field("title", &state.task.title)
            .field("dirty", &state.dirty)
            .field("revision", &state.revision)
            .finish()
    }
}

fn replace<T: PartialEq>(
    slot: &mut T,
    value: T,
    field: TaskField,
    changed: &mut Vec<TaskField>,
) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    changed.push(field);
    true
}

impl EditableTask {
    /// Wrap a task. The record starts clean and detached.
    #[must_use]
    pub fn new(task: Task) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RecordState {
                    task,
                    dirty: false,
                    revision: 0,
                }),
                observer: Mutex::new(None),
            }),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Task) -> R) -> R {
        f(&lock(&self.inner.state).task)
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.read(|t| t.id)
    }

    /// Copy of the current task state.
    #[must_use]
    pub fn snapshot(&self) -> Task {
        self.read(Clone::clone)
    }

    /// Current state together with the revision it corresponds to.
    #[must_use]
    pub fn snapshot_with_revision(&self) -> (Task, u64) {
        let state = lock(&self.inner.state);
        (state.task.clone(), state.revision)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        lock(&self.inner.state).dirty
    }

    /// Number of effective edits since the record was created.
    #[must_use]
    pub fn revision(&self) -> u64 {
        lock(&self.inner.state).revision
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.read(|t| t.title.clone())
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.read(|t| t.description.clone())
    }

    #[must_use]
    pub fn priority(&self) -> TaskPriority {
        self.read(|t| t.priority)
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.read(|t| t.status)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.read(|t| t.created_at)
    }

    #[must_use]
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.read(|t| t.due_at)
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.read(|t| t.completed_at)
    }

    #[must_use]
    pub fn assigned_to(&self) -> String {
        self.read(|t| t.assigned_to.clone())
    }

    #[must_use]
    pub fn category(&self) -> String {
        self.read(|t| t.category.clone())
    }

    #[must_use]
    pub fn estimated_hours(&self) -> i32 {
        self.read(|t| t.estimated_hours)
    }

    #[must_use]
    pub fn actual_hours(&self) -> i32 {
        self.read(|t| t.actual_hours)
    }

    #[must_use]
    pub fn completion_percentage(&self) -> f64 {
        self.read(|t| t.completion_percentage)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.read(Task::is_completed)
    }

    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.read(|t| t.is_overdue(Utc::now()))
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.edit(|t, changed| {
            replace(&mut t.title, title, TaskField::Title, changed);
        });
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.edit(|t, changed| {
            replace(&mut t.description, description, TaskField::Description, changed);
        });
    }

    pub fn set_priority(&self, priority: TaskPriority) {
        self.edit(|t, changed| {
            replace(&mut t.priority, priority, TaskField::Priority, changed);
        });
    }

    /// Change status and normalize the completion fields.
    ///
    /// ```text
    /// not_started -> 0%
    /// completed   -> 100%, completed_at = now if unset
    /// in_progress -> 50% if currently exactly 0% or 100%
    /// ```
    #[allow(clippy::float_cmp)]
    pub fn set_status(&self, status: TaskStatus) {
        self.edit(|t, changed| {
            if !replace(&mut t.status, status, TaskField::Status, changed) {
                return;
            }
            changed.extend([TaskField::IsCompleted, TaskField::IsOverdue]);

            let percentage = match status {
                TaskStatus::NotStarted => Some(NOT_STARTED),
                TaskStatus::Completed => Some(COMPLETE),
                TaskStatus::InProgress
                    if t.completion_percentage == NOT_STARTED
                        || t.completion_percentage == COMPLETE =>
                {
                    Some(STARTED)
                }
                _ => None,
            };
            if let Some(pct) = percentage {
                replace(
                    &mut t.completion_percentage,
                    pct,
                    TaskField::CompletionPercentage,
                    changed,
                );
            }

            if status == TaskStatus::Completed && t.completed_at.is_none() {
                t.completed_at = Some(Utc::now());
                changed.push(TaskField::CompletedAt);
            }
        });
    }

    pub fn set_due_at(&self, due_at: Option<DateTime<Utc>>) {
        self.edit(|t, changed| {
            if replace(&mut t.due_at, due_at, TaskField::DueAt, changed) {
                changed.push(TaskField::IsOverdue);
            }
        });
    }

    pub fn set_assigned_to(&self, assigned_to: impl Into<String>) {
        let assigned_to = assigned_to.into();
        self.edit(|t, changed| {
            replace(&mut t.assigned_to, assigned_to, TaskField::AssignedTo, changed);
        });
    }

    pub fn set_category(&self, category: impl Into<String>) {
        let category = category.into();
        self.edit(|t, changed| {
            replace(&mut t.category, category, TaskField::Category, changed);
        });
    }

    pub fn set_estimated_hours(&self, hours: i32) {
        self.edit(|t, changed| {
            replace(&mut t.estimated_hours, hours, TaskField::EstimatedHours, changed);
        });
    }

    pub fn set_actual_hours(&self, hours: i32) {
        self.edit(|t, changed| {
            replace(&mut t.actual_hours, hours, TaskField::ActualHours, changed);
        });
    }

    pub fn set_completion_percentage(&self, percentage: f64) {
        self.edit(|t, changed| {
            replace(
                &mut t.completion_percentage,
                percentage,
                TaskField::CompletionPercentage,
                changed,
            );
        });
    }

    /// Clear the dirty flag. Emits nothing.
    pub fn reset_dirty(&self) {
        lock(&self.inner.state).dirty = false;
    }

    /// Record a successful save of the state taken at `revision`.
    ///
    /// If nothing was edited since, copies the derived fields from `saved`
    /// and clears the dirty flag; returns `false` (leaving the record dirty)
    /// when a newer edit exists.
    pub fn mark_saved(&self, revision: u64, saved: &Task) -> bool {
        let mut changed = Vec::new();
        {
            let mut state = lock(&self.inner.state);
            if state.revision != revision {
                return false;
            }
            let task = &mut state.task;
            replace(
                &mut task.completion_percentage,
                saved.completion_percentage,
                TaskField::CompletionPercentage,
                &mut changed,
            );
            replace(
                &mut task.completed_at,
                saved.completed_at,
                TaskField::CompletedAt,
                &mut changed,
            );
            state.dirty = false;
        }

        if let Some(observer) = self.observer() {
            let id = self.id();
            for field in changed {
                observer.on_field_changed(id, field);
            }
        }
        true
    }

    /// Route future notifications to `observer`, replacing any previous one.
    pub fn attach(&self, observer: Arc<dyn RecordObserver>) {
        *lock(&self.inner.observer) = Some(observer);
    }

    /// Stop notifying. A detached record still accepts edits.
    pub fn detach(&self) {
        *lock(&self.inner.observer) = None;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        lock(&self.inner.observer).is_some()
    }

    /// Whether both handles refer to the same record.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn observer(&self) -> Option<Arc<dyn RecordObserver>> {
        lock(&self.inner.observer).clone()
    }

    fn edit(&self, apply: impl FnOnce(&mut Task, &mut Vec<TaskField>)) {
        let mut changed = Vec::new();
        let (id, became_dirty) = {
            let mut state = lock(&self.inner.state);
            apply(&mut state.task, &mut changed);
            if changed.is_empty() {
                return;
            }
            state.revision += 1;
            let was_dirty = std::mem::replace(&mut state.dirty, true);
            (state.task.id, !was_dirty)
        };

        let Some(observer) = self.observer() else {
            return;
        };
        for field in &changed {
            observer.on_field_changed(id, *field);
        }
        if became_dirty {
            observer.on_field_changed(id, TaskField::IsDirty);
        }
        if changed
            .iter()
            .any(|f| matches!(f, TaskField::Status | TaskField::DueAt))
        {
            observer.on_statistics_changed(id);
        }
        observer.on_modified(self);
    }
}
