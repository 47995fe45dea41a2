//! # In-Memory Message Store
//!
//! Process-local implementation of [`MessageStore`] with the same ordering and
//! transactional semantics as the SQLite store.
//!
//! **Advantages**:
//! - No I/O, nothing to clean up
//! - Great for testing and throwaway sessions
//!
//! **Limitations**:
//! - Data is lost on restart
//!
//! ## Thread Safety
//!
//! The store uses `Arc<RwLock<>>`; each call takes the lock once, so every call
//! observes or applies a consistent snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::StorageError;
use crate::models::{MessageRecord, Page, PageCursor};
use crate::store::MessageStore;

#[derive(Debug, Default)]
struct Inner {
    /// Ascending by `(timestamp, seq)`.
    rows: Vec<(i64, MessageRecord)>,
    ids: HashSet<String>,
    next_seq: i64,
}

impl Inner {
    fn key(seq: i64, record: &MessageRecord) -> PageCursor {
        PageCursor {
            timestamp: record.timestamp,
            seq,
        }
    }

    fn insert(&mut self, mut record: MessageRecord) {
        record.timestamp = MessageRecord::normalize(record.timestamp);
        self.next_seq += 1;
        let seq = self.next_seq;
        let key = Self::key(seq, &record);
        let at = self
            .rows
            .partition_point(|(s, r)| Self::key(*s, r) < key);
        self.ids.insert(record.id.clone());
        self.rows.insert(at, (seq, record));
    }

    /// Newest `limit` rows strictly below `end` (an index into `rows`), as a page.
    fn page_ending_at(&self, end: usize, limit: usize) -> Page {
        let start = end.saturating_sub(limit);
        let newest_first: Vec<_> = self.rows[start..end].iter().rev().cloned().collect();
        Page::from_newest_first(newest_first)
    }
}

/// In-memory message store for testing and development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryMessageStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Page, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.page_ending_at(inner.rows.len(), limit))
    }

    async fn fetch_before(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Page, StorageError> {
        let inner = self.inner.read().await;
        let end = inner.rows.partition_point(|(_, r)| r.timestamp < before);
        Ok(inner.page_ending_at(end, limit))
    }

    async fn fetch_before_cursor(
        &self,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Page, StorageError> {
        let inner = self.inner.read().await;
        let end = inner
            .rows
            .partition_point(|(s, r)| Inner::key(*s, r) < cursor);
        Ok(inner.page_ending_at(end, limit))
    }

    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn save(&self, record: &MessageRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if inner.ids.contains(&record.id) {
            return Err(StorageError::AlreadyExists(record.id.clone()));
        }
        inner.insert(record.clone());
        info!("Saved message: id={}", record.id);
        Ok(())
    }

    async fn save_batch(&self, records: &[MessageRecord]) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;

        let mut incoming = HashSet::with_capacity(records.len());
        for record in records {
            if inner.ids.contains(&record.id) || !incoming.insert(record.id.as_str()) {
                return Err(StorageError::AlreadyExists(record.id.clone()));
            }
        }

        for record in records {
            inner.insert(record.clone());
        }
        info!("Saved batch of {} messages", records.len());
        Ok(())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.inner.read().await.rows.len())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        let removed = inner.rows.len();
        inner.rows.clear();
        inner.ids.clear();
        info!("Deleted all {} messages", removed);
        Ok(())
    }
}
