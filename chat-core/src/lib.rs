//! # chat-core
//!
//! Shared setup for the chat history workspace: [`ChatConfig`] loaded from the
//! environment, [`CoreError`], and tracing initialization. Used by chat-cli and
//! the session controller's callers.

pub mod config;
pub mod error;
pub mod logger;

pub use config::{ChatConfig, StoreType, DEFAULT_PAGE_SIZE, DEFAULT_SEED_COUNT};
pub use error::{CoreError, Result};
pub use logger::init_tracing;
