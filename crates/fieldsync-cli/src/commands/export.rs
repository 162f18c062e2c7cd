use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync export`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx.engine.export_snapshot().await?;
    output(&summary, flags.format)
}
