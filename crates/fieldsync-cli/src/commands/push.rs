use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync push [SLUG]`.
pub async fn handle(slug: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let pushed = ctx.engine.push(slug).await?;
    output(&pushed, flags.format)
}
