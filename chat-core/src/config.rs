use std::env;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Messages per page when `PAGE_SIZE` is unset or unparsable.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Size of the synthetic history written into an empty store.
pub const DEFAULT_SEED_COUNT: usize = 1000;

/// Which durable store backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    Sqlite,
    Memory,
}

impl FromStr for StoreType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreType::Sqlite),
            "memory" => Ok(StoreType::Memory),
            other => Err(CoreError::Config(format!(
                "STORE_TYPE must be `sqlite` or `memory`, got `{}`",
                other
            ))),
        }
    }
}

/// Chat history configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub database_url: String,
    pub store_type: StoreType,
    /// Always at least 1.
    pub page_size: usize,
    /// Number of messages `ensure_seeded` writes into an empty store.
    pub seed_count: usize,
    pub log_file: String,
}

impl ChatConfig {
    /// Loads configuration from the environment.
    ///
    /// `DATABASE_URL`, `STORE_TYPE`, `PAGE_SIZE`, `SEED_MESSAGES_COUNT`, `LOG_FILE`.
    /// Unparsable numbers fall back to defaults; an unknown store type is an error.
    pub fn load() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "./chat_history.db".to_string());
        let store_type = match env::var("STORE_TYPE") {
            Ok(s) => s.parse()?,
            Err(_) => StoreType::Sqlite,
        };
        let page_size = env::var("PAGE_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1);
        let seed_count = env::var("SEED_MESSAGES_COUNT")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SEED_COUNT);
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/chat-history.log".to_string());

        Ok(Self {
            database_url,
            store_type,
            page_size,
            seed_count,
            log_file,
        })
    }
}
