use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chat;
pub mod history;
pub mod leaders;

use crate::backend::ApiClient;
use crate::chat::SessionStore;
use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};

#[derive(Subcommand)]
enum Command {
    /// List the leaders available to chat with
    Leaders {},
    /// Print the current conversation with a leader
    History {
        #[arg(long)]
        leader: String,
    },
    /// Start a chat session with a leader
    Chat {
        #[arg(long)]
        leader: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing(default_filter: String) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn api_client(config: &AppConfig) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(
        &config.api_url,
        config.auth_token.as_deref(),
        config.request_timeout,
    ))
}

/// Session ids are kept in the local db. If it can't be opened the
/// ids only last until the process exits.
pub async fn session_store(config: &AppConfig) -> Arc<SessionStore> {
    let store: Arc<dyn KeyValueStore> = match async_db(&config.db_path).await {
        Ok(db) => Arc::new(SqliteStore::new(&db)),
        Err(e) => {
            tracing::warn!(
                "Failed to open db at {}, sessions will not be saved: {:?}",
                config.db_path,
                e
            );
            Arc::new(MemoryStore::new())
        }
    };
    Arc::new(SessionStore::new(store))
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Keep logs out of the way of the conversation
    let default_filter = match args.command {
        Some(Command::Chat { .. }) => format!("{}=warn", env!("CARGO_CRATE_NAME")),
        _ => format!("{}=debug", env!("CARGO_CRATE_NAME")),
    };
    init_tracing(default_filter);

    // Handle each sub command
    match args.command {
        Some(Command::Leaders {}) => {
            leaders::run(&config).await?;
        }
        Some(Command::History { leader }) => {
            history::run(&config, &leader).await?;
        }
        Some(Command::Chat { leader }) => {
            chat::run(&config, &leader).await?;
        }
        None => {}
    }

    Ok(())
}
