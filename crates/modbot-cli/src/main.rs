//! CLI entry point for modbot.
//!
//! This binary provides the `modbot` command for initializing and
//! inspecting the record store outside of the running bot.

mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use modbot_store::RecordStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Output;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = config::resolve(cli.config.as_deref(), cli.database.clone())?;
    init_tracing(&config.log.level);

    let store = open_store(&config).await?;
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Init => {
            println!("  Record store ready at {}", config.store.path.display());
            Ok(())
        }
        Commands::Status => commands::status(&store, out).await,
        Commands::Warnings { action } => commands::warnings(&store, action, out).await,
        Commands::History { guild, user } => commands::history(&store, guild, user, out).await,
        Commands::LogChannel { action } => commands::log_channel(&store, action, out).await,
        Commands::Showcases { action } => commands::showcases(&store, action, out).await,
        Commands::Followers { action } => commands::followers(&store, action, out).await,
        Commands::Tickets { action } => commands::tickets(&store, action, out).await,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the record store, creating the parent directory if needed.
async fn open_store(config: &config::AppConfig) -> Result<RecordStore> {
    let path = config.store.path.clone();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let store = RecordStore::open(path.clone(), config.database_options())
        .await
        .context("failed to open record store")?;
    info!(path = %path.display(), "store initialized");
    Ok(store)
}

/// Initialize the tracing subscriber with the given default log level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
