use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Status { slug } => commands::status::handle(slug.as_deref(), ctx, flags).await,
        Commands::Push { slug } => commands::push::handle(slug.as_deref(), ctx, flags).await,
        Commands::Pull { slug, mode } => {
            commands::pull::handle(slug.as_deref(), mode.into(), ctx, flags).await
        }
        Commands::Export => commands::export::handle(ctx, flags).await,
        Commands::Import(args) => commands::import::handle(&args, ctx, flags).await,
        Commands::AutoSync => commands::auto_sync::handle(ctx, flags).await,
        Commands::Group { action } => commands::group::handle(&action, ctx, flags).await,
        Commands::Field { action } => commands::field::handle(&action, ctx, flags).await,
        Commands::Value { action } => commands::value::handle(&action, ctx, flags).await,
    }
}
