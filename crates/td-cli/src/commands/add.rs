use td_core::entities::Task;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AddArgs;
use crate::commands::shared::parse::{parse_due, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub async fn run(args: AddArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let task = build_task(args)?;
    let task = ctx.service.create(task).await?;
    output(&task, flags.format)
}

fn build_task(args: AddArgs) -> anyhow::Result<Task> {
    let mut task = Task::draft(args.title);
    if let Some(description) = args.description {
        task.description = description;
    }
    if let Some(priority) = args.priority.as_deref() {
        task.priority = parse_enum(priority, "priority")?;
    }
    if let Some(status) = args.status.as_deref() {
        task.status = parse_enum(status, "status")?;
    }
    if let Some(due) = args.due.as_deref() {
        task.due_at = parse_due(due)?;
    }
    if let Some(assignee) = args.assignee {
        task.assigned_to = assignee;
    }
    if let Some(category) = args.category {
        task.category = category;
    }
    if let Some(hours) = args.estimated_hours {
        task.estimated_hours = hours;
    }
    if let Some(hours) = args.actual_hours {
        task.actual_hours = hours;
    }
    Ok(task)
}

#[cfg(test)]
mod tests {
    use td_core::enums::{TaskPriority, TaskStatus};

    use super::*;

    fn args(title: &str) -> AddArgs {
        AddArgs {
            title: title.to_string(),
            description: None,
            priority: None,
            status: None,
            due: None,
            assignee: None,
            category: None,
            estimated_hours: None,
            actual_hours: None,
        }
    }

    #[test]
    fn defaults_come_from_draft() {
        let task = build_task(args("Plain")).unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert!(!task.is_persisted());
    }

    #[test]
    fn parses_enum_fields() {
        let mut a = args("Urgent");
        a.priority = Some("critical".into());
        a.status = Some("in-progress".into());
        a.estimated_hours = Some(6);

        let task = build_task(a).unwrap();
        assert_eq!(task.priority, TaskPriority::Critical);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.estimated_hours, 6);
    }

    #[test]
    fn rejects_bad_priority() {
        let mut a = args("Bad");
        a.priority = Some("urgent".into());
        assert!(build_task(a).is_err());
    }
}
