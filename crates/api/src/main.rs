//! Timesheet - headless time tracking with remote sync
//!
//! Main entry point for the `timesheet` binary.

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use timesheet_lib::cli::{self, Cli, CliCommand};
use timesheet_lib::utils::logging::init_tracing;
use timesheet_lib::AppContext;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env before anything reads them
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let command = Cli::parse().into_command();
    let config = timesheet_infra::config::load().context("failed to load configuration")?;
    let ctx = AppContext::new(config).context("failed to initialize application context")?;
    if command.needs_remote() {
        ctx.initialize().await;
    }

    let outcome = run(&ctx, command).await;

    if let Err(e) = ctx.shutdown().await {
        warn!(error = %e, "shutdown did not complete cleanly");
    }
    outcome
}

async fn run(ctx: &AppContext, command: CliCommand) -> anyhow::Result<()> {
    if command == CliCommand::Serve {
        info!(backend = ctx.config.remote.backend(), "running until interrupted");
        tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
        info!("interrupt received");
        return Ok(());
    }

    let value = cli::execute(ctx, command).await?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &value)?;
    writeln!(out)?;
    Ok(())
}
