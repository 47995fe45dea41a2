//! # Message Store
//!
//! The durable-store contract the session controller paginates over.
//!
//! Every method is one logical transaction with a single success or failure
//! outcome. Implementations must not share mutable cursor state between
//! calls; concurrent calls are independent.
//!
//! ## Ordering
//!
//! Records are ordered by `(timestamp, seq)` where `seq` is the insertion
//! sequence the store assigns. Every fetch returns its batch oldest-first so
//! callers can append it directly to a chronological list.
//!
//! ## Implementations
//!
//! - [`crate::SqliteMessageStore`]: persistent, sqlx + SQLite
//! - [`crate::InMemoryMessageStore`]: process-local, for tests and throwaway sessions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::StorageError;
use crate::models::{MessageRecord, Page, PageCursor};

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Up to `limit` most recent records, oldest-first.
    async fn fetch_recent(&self, limit: usize) -> Result<Page, StorageError>;

    /// Up to `limit` records with `timestamp < before` (strict), oldest-first.
    ///
    /// Records sharing the boundary timestamp are excluded, so timestamp ties
    /// across a page boundary can be skipped. Use [`Self::fetch_before_cursor`]
    /// to paginate without gaps.
    async fn fetch_before(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Page, StorageError>;

    /// Up to `limit` records strictly older than `cursor` in `(timestamp, seq)` order, oldest-first.
    async fn fetch_before_cursor(
        &self,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Page, StorageError>;

    /// Ascending offset pagination over the whole history.
    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StorageError>;

    /// Persists one record. On error the record is not stored.
    async fn save(&self, record: &MessageRecord) -> Result<(), StorageError>;

    /// Persists all records or none of them.
    async fn save_batch(&self, records: &[MessageRecord]) -> Result<(), StorageError>;

    async fn count(&self) -> Result<usize, StorageError>;

    /// Deletes every record in one transaction.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn fetch_recent(&self, limit: usize) -> Result<Page, StorageError> {
        (**self).fetch_recent(limit).await
    }

    async fn fetch_before(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Page, StorageError> {
        (**self).fetch_before(before, limit).await
    }

    async fn fetch_before_cursor(
        &self,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Page, StorageError> {
        (**self).fetch_before_cursor(cursor, limit).await
    }

    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        (**self).fetch_page(limit, offset).await
    }

    async fn save(&self, record: &MessageRecord) -> Result<(), StorageError> {
        (**self).save(record).await
    }

    async fn save_batch(&self, records: &[MessageRecord]) -> Result<(), StorageError> {
        (**self).save_batch(records).await
    }

    async fn count(&self) -> Result<usize, StorageError> {
        (**self).count().await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        (**self).clear_all().await
    }
}
