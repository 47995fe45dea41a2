//! CLI parser, store selection and session construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use chat_core::{ChatConfig, StoreType};
use chat_session::{SessionController, SessionOptions};
use clap::{Parser, Subcommand};
use storage::{InMemoryMessageStore, MessageStore, SqliteMessageStore};

#[derive(Parser, Debug)]
#[command(name = "chat")]
#[command(about = "Local chat history: seed, page through, send, clear", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Overrides PAGE_SIZE.
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Fill an empty store with the synthetic history (no-op when it has messages).
    Seed,
    /// Print the newest page, plus `pages - 1` older pages.
    History {
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },
    /// Send a message as the local user.
    Send { text: String },
    /// Print the number of stored messages.
    Count,
    /// Delete every stored message.
    Clear,
}

/// Opens the store selected by `STORE_TYPE`.
pub async fn open_store(config: &ChatConfig) -> Result<Arc<dyn MessageStore>> {
    match config.store_type {
        StoreType::Sqlite => {
            let store = SqliteMessageStore::new(&config.database_url)
                .await
                .with_context(|| format!("Open SQLite store at {}", config.database_url))?;
            Ok(Arc::new(store))
        }
        StoreType::Memory => Ok(Arc::new(InMemoryMessageStore::new())),
    }
}

/// Builds a session over the configured store; `page_size` overrides the config.
pub async fn build_session(
    config: &ChatConfig,
    page_size: Option<usize>,
) -> Result<SessionController> {
    let store = open_store(config).await?;
    let options = SessionOptions {
        page_size: page_size.unwrap_or(config.page_size),
        seed_count: config.seed_count,
    };
    Ok(SessionController::with_options(store, options))
}
