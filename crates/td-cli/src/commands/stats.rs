use serde::Serialize;
use td_service::Statistics;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct StatsResponse {
    total: usize,
    overdue: usize,
    by_status: Statistics,
}

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let by_status = ctx.service.statistics().await?;
    let overdue = ctx.service.overdue().await?.len();
    let response = StatsResponse {
        total: by_status.values().sum(),
        overdue,
        by_status,
    };
    output(&response, flags.format)
}
