//! # chat-cli
//!
//! Argument parsing and session wiring for the `chat` binary.

pub mod cli;

pub use cli::{build_session, open_store, Cli, Commands};
pub use chat_core::ChatConfig;
