use chrono::{DateTime, Utc};
use td_autosave::EditableTask;
use td_core::enums::{TaskPriority, TaskStatus};

use super::parse::{parse_due, parse_enum};

/// One field assignment on a live record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldEdit {
    Title(String),
    Description(String),
    Priority(TaskPriority),
    Status(TaskStatus),
    Due(Option<DateTime<Utc>>),
    Assignee(String),
    Category(String),
    EstimatedHours(i32),
    ActualHours(i32),
    Completion(f64),
}

/// Names accepted by [`FieldEdit::parse`].
pub const FIELD_NAMES: &str =
    "title, description, priority, status, due, assignee, category, estimated, actual, completion";

impl FieldEdit {
    /// Parse `field value` as typed in the shell.
    pub fn parse(field: &str, value: &str) -> anyhow::Result<Self> {
        let edit = match field {
            "title" => Self::Title(value.to_string()),
            "description" | "desc" => Self::Description(value.to_string()),
            "priority" => Self::Priority(parse_enum(value, "priority")?),
            "status" => Self::Status(parse_enum(value, "status")?),
            "due" => Self::Due(parse_due(value)?),
            "assignee" | "assigned_to" => Self::Assignee(value.to_string()),
            "category" => Self::Category(value.to_string()),
            "estimated" | "estimated_hours" => Self::EstimatedHours(parse_number(value, field)?),
            "actual" | "actual_hours" => Self::ActualHours(parse_number(value, field)?),
            "completion" | "percent" => Self::Completion(parse_number(value, field)?),
            other => anyhow::bail!("unknown field '{other}' (expected one of: {FIELD_NAMES})"),
        };
        Ok(edit)
    }

    /// Apply through the record's setters so notifications and auto-save fire.
    pub fn apply(self, record: &EditableTask) {
        match self {
            Self::Title(value) => record.set_title(value),
            Self::Description(value) => record.set_description(value),
            Self::Priority(value) => record.set_priority(value),
            Self::Status(value) => record.set_status(value),
            Self::Due(value) => record.set_due_at(value),
            Self::Assignee(value) => record.set_assigned_to(value),
            Self::Category(value) => record.set_category(value),
            Self::EstimatedHours(value) => record.set_estimated_hours(value),
            Self::ActualHours(value) => record.set_actual_hours(value),
            Self::Completion(value) => record.set_completion_percentage(value),
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|error| anyhow::anyhow!("invalid {field} '{value}': {error}"))
}
