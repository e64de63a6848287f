use td_core::entities::Task;
use td_core::enums::{TaskPriority, TaskStatus};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Run the most selective filter as a query, then narrow by the others.
pub async fn run(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = args
        .status
        .as_deref()
        .map(|raw| parse_enum::<TaskStatus>(raw, "status"))
        .transpose()?;
    let priority = args
        .priority
        .as_deref()
        .map(|raw| parse_enum::<TaskPriority>(raw, "priority"))
        .transpose()?;
    let assignee = args.assignee.as_deref();

    let mut tasks: Vec<Task> = if args.overdue {
        ctx.service.overdue().await?
    } else if let Some(status) = status {
        ctx.service.by_status(status).await?
    } else if let Some(priority) = priority {
        ctx.service.by_priority(priority).await?
    } else if let Some(assignee) = assignee {
        ctx.service.by_assignee(assignee).await?
    } else {
        ctx.service.list_all().await?
    };

    if let Some(status) = status {
        tasks.retain(|task| task.status == status);
    }
    if let Some(priority) = priority {
        tasks.retain(|task| task.priority == priority);
    }
    if let Some(assignee) = assignee {
        tasks.retain(|task| task.assigned_to.contains(assignee));
    }

    output(&tasks, flags.format)
}
