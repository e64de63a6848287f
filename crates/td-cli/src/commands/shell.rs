use std::io::{IsTerminal, Write};

use serde::Serialize;
use td_autosave::{CollectionEvent, EditableTask, TaskCollection};
use td_core::entities::{Task, TaskId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::cli::GlobalFlags;
use crate::commands::shared::edit::{FIELD_NAMES, FieldEdit};
use crate::context::AppContext;
use crate::output::output;

const HELP: &str = "\
commands:
  load                       reload every task
  search <term>              show tasks matching <term>
  add                        create a new task at the top
  del <id>                   delete a task
  set <id> <field> <value>   edit a field (saved automatically)
  stats                      counts over the listed tasks
  show [id]                  print the listed tasks, or one task
  help                       this text
  quit                       wait for pending saves and exit";

#[derive(Debug, PartialEq)]
pub enum ShellCommand {
    Load,
    Search(String),
    Add,
    Delete(TaskId),
    Set { id: TaskId, edit: FieldEdit },
    Stats,
    Show(Option<TaskId>),
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ShellCommand>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "" => return Ok(None),
        "load" | "refresh" => ShellCommand::Load,
        "search" => ShellCommand::Search(rest.to_string()),
        "add" => ShellCommand::Add,
        "del" | "delete" => ShellCommand::Delete(parse_id(rest)?),
        "set" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let (Some(id), Some(field)) = (parts.next(), parts.next()) else {
                anyhow::bail!("usage: set <id> <field> <value> (fields: {FIELD_NAMES})");
            };
            let value = parts.next().unwrap_or("").trim();
            ShellCommand::Set {
                id: parse_id(id)?,
                edit: FieldEdit::parse(field, value)?,
            }
        }
        "stats" => ShellCommand::Stats,
        "show" | "ls" => {
            ShellCommand::Show((!rest.is_empty()).then(|| parse_id(rest)).transpose()?)
        }
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => anyhow::bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> anyhow::Result<TaskId> {
    raw.trim()
        .parse()
        .map_err(|error| anyhow::anyhow!("invalid task id '{raw}': {error}"))
}

#[derive(Serialize)]
struct ShellRow {
    #[serde(flatten)]
    task: Task,
    dirty: bool,
}

impl From<&EditableTask> for ShellRow {
    fn from(record: &EditableTask) -> Self {
        Self {
            task: record.snapshot(),
            dirty: record.is_dirty(),
        }
    }
}

#[derive(Serialize)]
struct ShellStats {
    total: usize,
    completed: usize,
    overdue: usize,
    in_progress: usize,
}

/// Handle `taskdeck shell`.
pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut collection = ctx.collection();
    let notifier = spawn_notifier(ctx.events.subscribe(), flags.quiet);
    let interactive = std::io::stdin().is_terminal();

    if let Err(error) = collection.load_all().await {
        eprintln!("error: {error}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("taskdeck> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(error) = execute(command, &mut collection, flags).await {
            eprintln!("error: {error:#}");
        }
    }

    ctx.scheduler.wait_idle().await;
    notifier.abort();
    Ok(())
}

async fn execute(
    command: ShellCommand,
    collection: &mut TaskCollection,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        ShellCommand::Load => {
            collection.load_all().await?;
        }
        ShellCommand::Search(term) => {
            collection.search(&term).await?;
            show_all(collection, flags)?;
        }
        ShellCommand::Add => {
            let record = collection.add_task().await?;
            output(&ShellRow::from(&record), flags.format)?;
        }
        ShellCommand::Delete(id) => {
            if !collection.delete(id).await? {
                anyhow::bail!("task {id} not found");
            }
        }
        ShellCommand::Set { id, edit } => {
            let Some(record) = collection.get(id) else {
                anyhow::bail!("task {id} is not in the current list");
            };
            edit.apply(record);
        }
        ShellCommand::Stats => {
            let stats = collection.stats();
            output(
                &ShellStats {
                    total: stats.total,
                    completed: stats.completed,
                    overdue: stats.overdue,
                    in_progress: stats.in_progress,
                },
                flags.format,
            )?;
        }
        ShellCommand::Show(None) => show_all(collection, flags)?,
        ShellCommand::Show(Some(id)) => {
            let Some(record) = collection.get(id) else {
                anyhow::bail!("task {id} is not in the current list");
            };
            output(&ShellRow::from(record), flags.format)?;
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn show_all(collection: &TaskCollection, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows: Vec<ShellRow> = collection.records().iter().map(ShellRow::from).collect();
    output(&rows, flags.format)
}

/// Print save results and status messages to stderr as they happen.
fn spawn_notifier(
    mut events: broadcast::Receiver<CollectionEvent>,
    quiet: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CollectionEvent::AutoSaveFailed { id, error }) => {
                    eprintln!("[task {id}] save failed: {error}");
                }
                Ok(CollectionEvent::AutoSaved { id }) if !quiet => eprintln!("[task {id}] saved"),
                Ok(CollectionEvent::StatusMessage(message)) if !quiet => eprintln!("{message}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "shell notifier lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use td_core::enums::TaskStatus;

    use super::*;

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn set_keeps_spaces_in_value() {
        assert_eq!(
            parse_line("set 4 title Fix the login bug").unwrap(),
            Some(ShellCommand::Set {
                id: 4,
                edit: FieldEdit::Title("Fix the login bug".into()),
            })
        );
    }

    #[test]
    fn set_parses_enum_values() {
        assert_eq!(
            parse_line("set 2 status completed").unwrap(),
            Some(ShellCommand::Set {
                id: 2,
                edit: FieldEdit::Status(TaskStatus::Completed),
            })
        );
    }

    #[test]
    fn set_without_field_is_an_error() {
        assert!(parse_line("set 2").is_err());
    }

    #[test]
    fn search_and_show() {
        assert_eq!(
            parse_line("search login page").unwrap(),
            Some(ShellCommand::Search("login page".into()))
        );
        assert_eq!(parse_line("search").unwrap(), Some(ShellCommand::Search(String::new())));
        assert_eq!(parse_line("show").unwrap(), Some(ShellCommand::Show(None)));
        assert_eq!(parse_line("show 9").unwrap(), Some(ShellCommand::Show(Some(9))));
    }

    #[test]
    fn del_requires_numeric_id() {
        assert_eq!(parse_line("del 3").unwrap(), Some(ShellCommand::Delete(3)));
        assert!(parse_line("del three").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_line("frobnicate").is_err());
    }
}
