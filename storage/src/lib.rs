//! Storage crate: durable, timestamp-ordered message history.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord, Page, PageCursor
//! - [`store`] – MessageStore trait
//! - [`sqlite_store`] – SqliteMessageStore (SQLite via sqlx)
//! - [`inmemory_store`] – InMemoryMessageStore
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod inmemory_store;
mod models;
mod sqlite_pool;
mod sqlite_store;
mod store;


pub use error::StorageError;
pub use inmemory_store::InMemoryMessageStore;
pub use models::{MessageRecord, Page, PageCursor};
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteMessageStore;
pub use store::MessageStore;
