//! Vaultscope CLI
//!
//! Citation-grounded research over your private document vault.

use anyhow::Result;
use clap::Parser;
use vaultscope_core::error::exit_codes;
use vaultscope_core::{Config, Database, VaultscopeError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let code = e
            .downcast_ref::<VaultscopeError>()
            .map(VaultscopeError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(config.database_path())?;
    db.initialize()?;

    match cli.command {
        Commands::Query(args) => commands::query::run(args, &db, cli.format).await,
        Commands::Run(args) => commands::run::run(args, &db, &config, cli.format).await,
        Commands::Vault(args) => commands::vault::run(args, &db, cli.format).await,
        Commands::Result(args) => commands::result::run(args, &db, cli.format).await,
        Commands::Feedback(args) => commands::feedback::run(args, &db, cli.format).await,
        Commands::Metrics => commands::metrics::run(&db, cli.format).await,
    }
}
