pub mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::catalog::ServiceCatalog;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "project-budget-api")]
#[command(about = "Project and budget tracking API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an admin account if the email is not registered")]
    CreateAdmin {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Password (8 or more characters)")]
        password: String,
    },

    #[command(about = "Check the health endpoint of a running server")]
    Health {
        #[arg(long, default_value = "http://127.0.0.1:5001", help = "Server base URL")]
        url: String,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateAdmin { name, email, password } => {
            commands::admin::handle(config, &name, &email, &password).await
        }
        Commands::Health { url } => commands::health::handle(&url).await,
    }
}

/// Application state backed by Postgres when `DATABASE_URL` is set, otherwise
/// by the in-memory store. Postgres schemas are migrated on connect.
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn Store> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            DatabaseManager::migrate(&pool).await.context("failed to migrate database")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set; using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = ServiceCatalog::load(config.catalog.path.as_deref()).context("failed to load service catalog")?;
    AppState::new(store, config, catalog).context("failed to build application state")
}
