pub mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "wanderlust")]
#[command(about = "Wanderlust - listings and reviews web application")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Load sample listings before serving")]
        seed: bool,
    },

    #[command(about = "Replace all listings with the sample data set")]
    Seed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Postgres when a database URL is configured, otherwise the in-memory store
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, &config.database)
                .await
                .context("failed to connect to database")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare database schema")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { seed: false }) {
        Commands::Serve { seed } => commands::serve::handle(seed).await,
        Commands::Seed => commands::seed::handle(output_format).await,
    }
}
