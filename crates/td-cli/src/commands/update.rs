use td_autosave::{CollectionEvent, EditableTask};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::UpdateArgs;
use crate::commands::shared::edit::FieldEdit;
use crate::commands::shared::parse::{parse_due, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Apply the requested edits to a live record and let auto-save persist it.
pub async fn run(args: UpdateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let id = args.id;
    let edits = collect_edits(args)?;

    let Some(task) = ctx.service.get(id).await? else {
        anyhow::bail!("task {id} not found");
    };

    let record = EditableTask::new(task);
    for edit in edits {
        edit.apply(&record);
    }

    if record.is_dirty() {
        let mut events = ctx.events.subscribe();
        ctx.scheduler.schedule(record.clone());
        ctx.scheduler.wait_idle().await;

        while let Ok(event) = events.try_recv() {
            match event {
                CollectionEvent::AutoSaveFailed { id: failed, error } if failed == id => {
                    anyhow::bail!("failed to save task {id}: {error}");
                }
                _ => {}
            }
        }
    } else {
        tracing::info!(task_id = id, "no changes to save");
    }

    output(&record.snapshot(), flags.format)
}

fn collect_edits(args: UpdateArgs) -> anyhow::Result<Vec<FieldEdit>> {
    let mut edits = Vec::new();
    if let Some(title) = args.title {
        edits.push(FieldEdit::Title(title));
    }
    if let Some(description) = args.description {
        edits.push(FieldEdit::Description(description));
    }
    if let Some(priority) = args.priority.as_deref() {
        edits.push(FieldEdit::Priority(parse_enum(priority, "priority")?));
    }
    if let Some(status) = args.status.as_deref() {
        edits.push(FieldEdit::Status(parse_enum(status, "status")?));
    }
    if let Some(due) = args.due.as_deref() {
        edits.push(FieldEdit::Due(parse_due(due)?));
    }
    if let Some(assignee) = args.assignee {
        edits.push(FieldEdit::Assignee(assignee));
    }
    if let Some(category) = args.category {
        edits.push(FieldEdit::Category(category));
    }
    if let Some(hours) = args.estimated_hours {
        edits.push(FieldEdit::EstimatedHours(hours));
    }
    if let Some(hours) = args.actual_hours {
        edits.push(FieldEdit::ActualHours(hours));
    }
    if let Some(completion) = args.completion {
        edits.push(FieldEdit::Completion(completion));
    }

    if edits.is_empty() {
        anyhow::bail!(
            "At least one of --title, --description, --priority, --status, --due, --assignee, \
             --category, --estimated-hours, --actual-hours or --completion must be provided"
        );
    }
    Ok(edits)
}

#[cfg(test)]
mod tests {
    use td_core::enums::TaskStatus;

    use super::*;

    fn params(id: i64) -> UpdateArgs {
        UpdateArgs {
            id,
            title: None,
            description: None,
            priority: None,
            status: None,
            due: None,
            assignee: None,
            category: None,
            estimated_hours: None,
            actual_hours: None,
            completion: None,
        }
    }

    #[test]
    fn rejects_noop_update() {
        assert!(collect_edits(params(1)).is_err());
    }

    #[test]
    fn status_before_completion_in_edit_order() {
        let mut args = params(1);
        args.completion = Some(70.0);
        args.status = Some("in_progress".into());

        let edits = collect_edits(args).unwrap();
        assert_eq!(
            edits,
            vec![
                FieldEdit::Status(TaskStatus::InProgress),
                FieldEdit::Completion(70.0)
            ]
        );
    }
}
