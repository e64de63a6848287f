//! # td-core
//!
//! Core types, validation, and derived-metric rules for Taskdeck.
//!
//! This crate provides the foundational pieces shared across all Taskdeck crates:
//! - The `Task` entity and its priority/status enums
//! - The validator deciding whether a task may be persisted
//! - The metrics calculator normalizing completion percentage and timestamp
//! - The async `TaskRepository` contract implemented by storage backends
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod metrics;
pub mod repository;
pub mod validation;
