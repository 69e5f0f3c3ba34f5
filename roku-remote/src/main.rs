use std::io;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use roku_remote::cli::Cli;
use roku_remote::commands;
use roku_remote::logging::{init_logging, mode_from_env, LoggingMode};
use roku_remote::{CliError, ConfigStore, Context};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", commands::error_line(&err));
        if let Some(hint) = err.downcast_ref::<CliError>().and_then(CliError::hint) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let fallback = if cli.is_interactive() {
        LoggingMode::Silent
    } else {
        LoggingMode::Development
    };
    init_logging(mode_from_env(fallback), &cli.log_level).context("Failed to initialize logging")?;

    let config = ConfigStore::load(cli.config.clone()).context("Failed to load configuration")?;
    debug!("Using config file {}", config.path().display());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let mut ctx = Context::new(config, cancel)
        .with_host(cli.host)
        .with_json(cli.json);

    let mut stdout = io::stdout();
    commands::run(cli.command, &mut ctx, &mut stdout).await?;
    Ok(())
}
