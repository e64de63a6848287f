use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: i64, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(task) = ctx.service.get(id).await? else {
        anyhow::bail!("task {id} not found");
    };
    output(&task, flags.format)
}
