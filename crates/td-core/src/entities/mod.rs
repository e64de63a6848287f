//! Entity structs for Taskdeck domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `td-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! output and schema validation.

mod task;

pub use task::{Task, TaskId, UNSAVED_ID};
