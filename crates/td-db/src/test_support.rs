//! Shared test utilities for td-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use td_core::entities::Task;

    use crate::SqlTaskRepository;

    /// Create an in-memory SQL repository with migrations applied.
    pub async fn test_repo() -> SqlTaskRepository {
        SqlTaskRepository::open(":memory:").await.unwrap()
    }

    /// An unsaved task with the given title and a non-empty description.
    pub fn task(title: &str) -> Task {
        let mut task = Task::draft(title);
        task.description = format!("{title} description");
        task
    }
}
