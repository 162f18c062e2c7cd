use anyhow::Context;
use fieldsync_core::entities::{FieldDraft, empty_bag};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{FieldAddArgs, FieldCommands};
use crate::commands::shared::parse::parse_json_bag;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync field`.
pub async fn handle(
    action: &FieldCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FieldCommands::Add(args) => add(args, ctx, flags).await,
    }
}

async fn add(args: &FieldAddArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = ctx.store();
    let group = store
        .find_group_by_slug(&args.group)
        .await?
        .with_context(|| format!("group '{}' not found", args.group))?;

    let mut draft = FieldDraft::new(group.id, &args.slug, args.field_type, &args.title);
    if let Some(parent) = &args.parent {
        let parent = store
            .find_field_by_slug(parent)
            .await?
            .with_context(|| format!("parent field '{parent}' not found"))?;
        draft.parent_id = Some(parent.id);
    }
    draft.position = args.position;
    draft.instructions.clone_from(&args.instructions);
    draft.config = parse_json_bag(args.config.as_deref(), "config", empty_bag())?;
    draft.validation = parse_json_bag(args.validation.as_deref(), "validation", empty_bag())?;
    draft.value_translatable = args.translatable;

    let field = store.create_field(&draft).await?;
    ctx.mark_dirty();
    output(&field, flags.format)
}
