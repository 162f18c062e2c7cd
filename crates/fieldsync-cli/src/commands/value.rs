use anyhow::Context;
use fieldsync_core::entities::FieldValue;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ValueCommands, ValueSetArgs};
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync value`.
pub async fn handle(
    action: &ValueCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ValueCommands::Set(args) => set(args, ctx, flags).await,
    }
}

async fn set(args: &ValueSetArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let field = ctx
        .store()
        .find_field_by_slug(&args.field)
        .await?
        .with_context(|| format!("field '{}' not found", args.field))?;

    let value = FieldValue {
        field_id: field.id,
        entity_type: args.entity_type.clone(),
        entity_id: args.entity_id,
        shop_id: args.shop,
        lang_id: args.lang,
        value: args.value.clone(),
        value_index: None,
    };
    ctx.store().save_value(&value).await?;
    ctx.mark_dirty();
    output(&value, flags.format)
}
