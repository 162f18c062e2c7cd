use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync status [SLUG]`.
pub async fn handle(slug: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match slug {
        Some(slug) => output(&ctx.engine.group_status(slug).await?, flags.format),
        None => output(&ctx.engine.global_status().await?, flags.format),
    }
}
