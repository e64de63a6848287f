//! libSQL-backed repository implementations.

pub mod task;
