use anyhow::Context;
use fieldsync_core::entities::GroupDraft;
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{GroupAddArgs, GroupCommands};
use crate::commands::shared::parse::parse_json_bag;
use crate::context::AppContext;
use crate::output::output;

/// Handle `fldsync group`.
pub async fn handle(
    action: &GroupCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GroupCommands::Add(args) => add(args, ctx, flags).await,
        GroupCommands::List => {
            let groups = ctx.store().find_all_groups().await?;
            output(&groups, flags.format)
        }
        GroupCommands::Delete { slug } => delete(slug, ctx, flags).await,
    }
}

async fn add(args: &GroupAddArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut draft = GroupDraft::new(&args.slug, &args.title);
    draft.description.clone_from(&args.description);
    draft.priority = args.priority;
    draft.location_rules = parse_json_bag(
        args.location_rules.as_deref(),
        "location rules",
        Value::Array(Vec::new()),
    )?;
    draft.placement_tab = args.placement_tab.clone().unwrap_or_default();
    draft.placement_position = args.placement_position.clone().unwrap_or_default();
    draft.shops.clone_from(&args.shops);
    draft.active = !args.inactive;

    let group = ctx.store().create_group(&draft).await?;
    ctx.mark_dirty();
    output(&group, flags.format)
}

async fn delete(slug: &str, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let group = ctx
        .store()
        .find_group_by_slug(slug)
        .await?
        .with_context(|| format!("group '{slug}' not found"))?;
    ctx.store().delete_group(group.id).await?;
    ctx.mark_dirty();
    output(&json!({ "deleted": group.slug, "id": group.id }), flags.format)
}
