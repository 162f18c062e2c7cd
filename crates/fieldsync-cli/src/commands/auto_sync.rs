use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync auto-sync`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.engine.auto_sync().await?;
    output(&report, flags.format)
}
