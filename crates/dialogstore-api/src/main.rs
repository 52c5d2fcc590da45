//! Dialogstore binary entry point.
//!
//! Parses CLI arguments, initializes tracing, builds the configuration from
//! file plus overrides, and dispatches to the selected command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use dialogstore_infra::config::load_config;
use dialogstore_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "dialogstore", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(&cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config).await?;
    cli.apply_overrides(&mut config);
    tracing::debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Migrate => cli::migrate::migrate(&config.database, cli.json).await,
        Commands::Status => cli::status::status(&config.database, cli.json).await,
        Commands::Serve { .. } => cli::serve::serve(&config).await,
        Commands::Completions { .. } => Ok(()),
    }
}
