//! # td-db
//!
//! Task storage for Taskdeck.
//!
//! Two implementations of `td_core::repository::TaskRepository`:
//! - [`SqlTaskRepository`] over a libSQL database ([`TaskDb`]), used by the CLI
//! - [`InMemoryTaskRepository`], used by tests and `--in-memory` sessions
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) with embedded migrations.

pub mod error;
pub mod helpers;
pub mod memory;
mod migrations;
pub mod repos;

#[cfg(test)]
mod test_support;

pub use memory::InMemoryTaskRepository;
pub use repos::task::SqlTaskRepository;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for task storage.
///
/// Wraps a libSQL database and a single connection.
pub struct TaskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl TaskDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let task_db = Self { db, conn };
        task_db.run_migrations().await?;
        tracing::debug!(path, "opened task database");
        Ok(task_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
