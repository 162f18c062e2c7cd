use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("fldsync error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let project_root = bootstrap::resolve_project_root(&flags)?;
    let config = bootstrap::load_config(&project_root)?;
    context::warn_unconfigured(&config);

    let mut ctx = context::AppContext::init(&project_root, config)
        .await
        .context("failed to initialize fieldsync application context")?;

    let command = cli.command;
    if !matches!(command, cli::Commands::AutoSync) {
        ctx.reconcile().await;
    }

    let result = commands::dispatch::dispatch(command, &mut ctx, &flags).await;

    // Flush regardless of the command outcome.
    let finished = ctx.finish().await;
    result.and(finished)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("FIELDSYNC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
