use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::List(args) => commands::list::run(&args, ctx, flags).await,
        Commands::Get { id } => commands::get::run(id, ctx, flags).await,
        Commands::Search { term } => commands::search::run(&term, ctx, flags).await,
        Commands::Add(args) => commands::add::run(args, ctx, flags).await,
        Commands::Update(args) => commands::update::run(args, ctx, flags).await,
        Commands::Delete { id } => commands::delete::run(id, ctx, flags).await,
        Commands::Stats => commands::stats::run(ctx, flags).await,
        Commands::Shell => commands::shell::run(ctx, flags).await,
        Commands::Schema => commands::schema::handle(flags),
    }
}
