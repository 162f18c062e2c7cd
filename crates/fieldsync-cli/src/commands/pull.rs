use fieldsync_core::enums::ImportMode;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync pull [SLUG] --mode`.
pub async fn handle(
    slug: Option<&str>,
    mode: ImportMode,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let result = ctx.engine.pull(slug, mode).await?;
    if result.touched_store() {
        ctx.mark_dirty();
    }
    output(&result, flags.format)
}
