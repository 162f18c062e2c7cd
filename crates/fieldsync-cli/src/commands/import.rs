use std::path::Path;

use fieldsync_sync::ImportOptions;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync import <FILE> --mode [--strict] [--atomic]`.
pub async fn handle(args: &ImportArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let options = ImportOptions::new(args.mode.into())
        .strict(args.strict)
        .atomic(args.atomic);
    let result = ctx.engine.import_file(Path::new(&args.file), options).await?;
    if result.touched_store() {
        ctx.mark_dirty();
    }
    output(&result, flags.format)
}
