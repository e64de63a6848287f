//! Derived task metrics.
//!
//! Completion percentage and completion timestamp are not edited directly in
//! the persisted form; they are normalized from the status (and, while in
//! progress, from the hours logged against the estimate) before every write.
//!
//! ```text
//! not_started  -> 0
//! completed    -> 100, completed_at = now if unset
//! in_progress  -> min(100, actual / estimated * 100) when both hours > 0
//! cancelled    -> unchanged
//! on_hold      -> unchanged
//! ```

use chrono::{DateTime, Utc};

use crate::entities::Task;
use crate::enums::TaskStatus;

pub const COMPLETE: f64 = 100.0;
pub const NOT_STARTED: f64 = 0.0;

/// Normalize `task` using the current time for any completion timestamp.
#[must_use]
pub fn recompute(task: Task) -> Task {
    recompute_at(task, Utc::now())
}

/// Normalize `task`, stamping `completed_at` with `now` if it must be set.
///
/// Idempotent: `recompute_at(recompute_at(t, now), now) == recompute_at(t, now)`.
#[must_use]
pub fn recompute_at(mut task: Task, now: DateTime<Utc>) -> Task {
    match task.status {
        TaskStatus::NotStarted => task.completion_percentage = NOT_STARTED,
        TaskStatus::Completed => {
            task.completion_percentage = COMPLETE;
            task.completed_at.get_or_insert(now);
        }
        TaskStatus::InProgress => {
            if let Some(pct) = hours_ratio(task.estimated_hours, task.actual_hours) {
                task.completion_percentage = pct;
            }
        }
        TaskStatus::Cancelled | TaskStatus::OnHold => {}
    }
    task
}

/// Percentage of the estimate consumed, capped at 100. `None` unless both
/// hour counts are positive.
#[must_use]
pub fn hours_ratio(estimated: i32, actual: i32) -> Option<f64> {
    (estimated > 0 && actual > 0)
        .then(|| (f64::from(actual) / f64::from(estimated) * 100.0).min(COMPLETE))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn task(status: TaskStatus, pct: f64) -> Task {
        Task {
            status,
            completion_percentage: pct,
            ..Task::draft("Metrics")
        }
    }

    #[test]
    fn completed_forces_full_completion_and_stamps_time() {
        let now = Utc::now();
        let result = recompute_at(task(TaskStatus::Completed, 50.0), now);
        assert_eq!(result.completion_percentage, 100.0);
        assert_eq!(result.completed_at, Some(now));
    }

    #[test]
    fn completed_keeps_existing_timestamp() {
        let earlier = Utc::now() - Duration::days(2);
        let mut input = task(TaskStatus::Completed, 100.0);
        input.completed_at = Some(earlier);
        let result = recompute_at(input, Utc::now());
        assert_eq!(result.completed_at, Some(earlier));
    }

    #[test]
    fn not_started_resets_completion() {
        let result = recompute(task(TaskStatus::NotStarted, 50.0));
        assert_eq!(result.completion_percentage, 0.0);
    }

    #[rstest]
    #[case(10, 5, 50.0)]
    #[case(10, 20, 100.0)]
    #[case(8, 2, 25.0)]
    fn in_progress_uses_hours(#[case] estimated: i32, #[case] actual: i32, #[case] expected: f64) {
        let mut input = task(TaskStatus::InProgress, 0.0);
        input.estimated_hours = estimated;
        input.actual_hours = actual;
        assert_eq!(recompute(input).completion_percentage, expected);
    }

    #[rstest]
    #[case(0, 5)]
    #[case(10, 0)]
    fn in_progress_without_hours_is_unchanged(#[case] estimated: i32, #[case] actual: i32) {
        let mut input = task(TaskStatus::InProgress, 30.0);
        input.estimated_hours = estimated;
        input.actual_hours = actual;
        assert_eq!(recompute(input).completion_percentage, 30.0);
    }

    #[rstest]
    #[case(TaskStatus::Cancelled)]
    #[case(TaskStatus::OnHold)]
    fn parked_statuses_keep_percentage(#[case] status: TaskStatus) {
        let mut input = task(status, 42.0);
        input.estimated_hours = 10;
        input.actual_hours = 9;
        let result = recompute(input);
        assert_eq!(result.completion_percentage, 42.0);
        assert_eq!(result.completed_at, None);
    }

    #[rstest]
    #[case(TaskStatus::NotStarted, 0, 0, 70.0)]
    #[case(TaskStatus::InProgress, 10, 5, 0.0)]
    #[case(TaskStatus::InProgress, 3, 7, 12.0)]
    #[case(TaskStatus::Completed, 8, 8, 10.0)]
    #[case(TaskStatus::Cancelled, 0, 0, 33.0)]
    #[case(TaskStatus::OnHold, 4, 1, 90.0)]
    fn recompute_is_idempotent(
        #[case] status: TaskStatus,
        #[case] estimated: i32,
        #[case] actual: i32,
        #[case] pct: f64,
    ) {
        let now = Utc::now();
        let mut input = task(status, pct);
        input.estimated_hours = estimated;
        input.actual_hours = actual;
        let once = recompute_at(input, now);
        let twice = recompute_at(once.clone(), now);
        assert_eq!(once, twice);
    }
}
