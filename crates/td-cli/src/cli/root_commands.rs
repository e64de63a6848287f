use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List tasks, optionally filtered.
    List(ListArgs),
    /// Get a task by ID.
    Get { id: i64 },
    /// Search titles, descriptions, assignees and categories.
    Search { term: String },
    /// Create a task.
    Add(AddArgs),
    /// Edit a task through the auto-save path and wait for the save.
    Update(UpdateArgs),
    /// Delete a task.
    Delete { id: i64 },
    /// Task counts per status.
    Stats,
    /// Interactive editing session over the live task list.
    Shell,
    /// Print the JSON schema of a task.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Substring of the assignee name (case-sensitive).
    #[arg(long)]
    pub assignee: Option<String>,
    /// Only tasks past their due date that are still open.
    #[arg(long)]
    pub overdue: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD.
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub estimated_hours: Option<i32>,
    #[arg(long)]
    pub actual_hours: Option<i32>,
}

#[derive(Clone, Debug, Args)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// RFC 3339 timestamp, YYYY-MM-DD, or "none" to clear.
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub estimated_hours: Option<i32>,
    #[arg(long)]
    pub actual_hours: Option<i32>,
    #[arg(long)]
    pub completion: Option<f64>,
}
