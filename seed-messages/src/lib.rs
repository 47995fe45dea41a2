//! Synthetic chat history used to bootstrap an empty store.

mod generate;

pub use chat_core::DEFAULT_SEED_COUNT;
pub use generate::{generate_messages, load_samples, Samples};
