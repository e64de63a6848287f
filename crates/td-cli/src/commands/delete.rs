use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct DeleteResponse {
    id: i64,
    deleted: bool,
}

pub async fn run(id: i64, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let deleted = ctx.service.delete(id).await?;
    if !deleted {
        anyhow::bail!("task {id} not found");
    }
    output(&DeleteResponse { id, deleted }, flags.format)
}
