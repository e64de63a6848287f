//! Task repository over libSQL.
//!
//! Priority is stored as its integer rank so `ORDER BY priority DESC` puts
//! critical work first. Status is stored as snake_case text.

use async_trait::async_trait;
use chrono::Utc;

use td_core::entities::{Task, TaskId};
use td_core::enums::{TaskPriority, TaskStatus};
use td_core::errors::CoreError;
use td_core::repository::TaskRepository;

use crate::TaskDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime,
    parse_priority,
};

const SELECT_COLS: &str = "id, title, description, priority, status, created_at, due_at, \
     completed_at, assigned_to, category, estimated_hours, actual_hours, completion_percentage";

/// Priority first, then soonest due. Undated tasks sort ahead of dated ones.
const ORDER_BY_PRIORITY_DUE: &str = "ORDER BY priority DESC, due_at ASC, id ASC";
const ORDER_BY_PRIORITY: &str = "ORDER BY priority DESC, id ASC";
const ORDER_BY_DUE: &str = "ORDER BY due_at ASC, id ASC";

fn hours(row: &libsql::Row, idx: i32) -> Result<i32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    i32::try_from(raw).map_err(|_| DatabaseError::Query(format!("hours out of range: {raw}")))
}

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_priority(row.get::<i64>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        due_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        assigned_to: row.get(8)?,
        category: row.get(9)?,
        estimated_hours: hours(row, 10)?,
        actual_hours: hours(row, 11)?,
        completion_percentage: row.get(12)?,
    })
}

/// `completed_at` to persist: completed tasks without one are stamped now.
fn completion_stamp(task: &Task) -> Option<String> {
    match (task.status, task.completed_at) {
        (_, Some(at)) => Some(format_datetime(at)),
        (TaskStatus::Completed, None) => Some(format_datetime(Utc::now())),
        _ => None,
    }
}

/// [`TaskRepository`] backed by a [`TaskDb`].
pub struct SqlTaskRepository {
    db: TaskDb,
}

impl SqlTaskRepository {
    #[must_use]
    pub const fn new(db: TaskDb) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database at `path` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::new(TaskDb::open_local(path).await?))
    }

    #[must_use]
    pub const fn db(&self) -> &TaskDb {
        &self.db
    }

    async fn fetch(
        &self,
        filter: &str,
        order: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!("SELECT {SELECT_COLS} FROM tasks {filter} {order}");
        let mut rows = self
            .db
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    async fn fetch_one(&self, id: TaskId) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, task: Task) -> Result<Task, DatabaseError> {
        let created_at = Utc::now();
        let mut rows = self
            .db
            .conn()
            .query(
                "INSERT INTO tasks (title, description, priority, status, created_at, due_at,
                    completed_at, assigned_to, category, estimated_hours, actual_hours,
                    completion_percentage)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 RETURNING id",
                libsql::params![
                    task.title.as_str(),
                    task.description.as_str(),
                    task.priority.rank(),
                    task.status.as_str(),
                    format_datetime(created_at),
                    task.due_at.map(format_datetime),
                    completion_stamp(&task),
                    task.assigned_to.as_str(),
                    task.category.as_str(),
                    i64::from(task.estimated_hours),
                    i64::from(task.actual_hours),
                    task.completion_percentage
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let id: TaskId = row.get(0)?;
        drop(rows);

        self.fetch_one(id).await?.ok_or(DatabaseError::NoResult)
    }

    async fn overwrite(&self, task: &Task) -> Result<Option<Task>, DatabaseError> {
        let affected = self
            .db
            .conn()
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, status = ?4,
                    due_at = ?5, completed_at = ?6, assigned_to = ?7, category = ?8,
                    estimated_hours = ?9, actual_hours = ?10, completion_percentage = ?11
                 WHERE id = ?12",
                libsql::params![
                    task.title.as_str(),
                    task.description.as_str(),
                    task.priority.rank(),
                    task.status.as_str(),
                    task.due_at.map(format_datetime),
                    completion_stamp(task),
                    task.assigned_to.as_str(),
                    task.category.as_str(),
                    i64::from(task.estimated_hours),
                    i64::from(task.actual_hours),
                    task.completion_percentage,
                    task.id
                ],
            )
            .await?;
        if affected == 0 {
            return Ok(None);
        }
        self.fetch_one(task.id).await
    }
}

#[async_trait]
impl TaskRepository for SqlTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.fetch("", ORDER_BY_PRIORITY_DUE, Vec::new()).await?)
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        Ok(self.fetch_one(id).await?)
    }

    async fn add(&self, task: Task) -> Result<Task, CoreError> {
        let stored = self.insert(task).await?;
        tracing::debug!(id = stored.id, "inserted task");
        Ok(stored)
    }

    async fn update(&self, task: Task) -> Result<Task, CoreError> {
        match self.overwrite(&task).await? {
            Some(stored) => Ok(stored),
            None => Err(CoreError::task_not_found(task.id)),
        }
    }

    async fn delete(&self, id: TaskId) -> Result<bool, CoreError> {
        let affected = self
            .db
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;
        Ok(affected > 0)
    }

    async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .fetch(
                "WHERE status = ?1",
                ORDER_BY_PRIORITY,
                vec![status.as_str().into()],
            )
            .await?)
    }

    async fn by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .fetch("WHERE priority = ?1", ORDER_BY_DUE, vec![priority.rank().into()])
            .await?)
    }

    async fn by_assignee(&self, assignee: &str) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .fetch(
                "WHERE instr(assigned_to, ?1) > 0",
                ORDER_BY_PRIORITY,
                vec![assignee.into()],
            )
            .await?)
    }

    async fn overdue(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self
            .fetch(
                "WHERE due_at IS NOT NULL AND due_at < ?1
                   AND status NOT IN ('completed', 'cancelled')",
                ORDER_BY_PRIORITY,
                vec![format_datetime(Utc::now()).into()],
            )
            .await?)
    }

    async fn search(&self, term: &str) -> Result<Vec<Task>, CoreError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.list().await;
        }
        // SQLite's lower() only folds ASCII, so matching happens here.
        let tasks = self.fetch("", ORDER_BY_PRIORITY, Vec::new()).await?;
        Ok(tasks
            .into_iter()
            .filter(|t| {
                [&t.title, &t.description, &t.assigned_to, &t.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect())
    }
}
