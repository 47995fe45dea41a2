//! Shared fixtures: a store wrapper that fails or stalls on demand.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use storage::{InMemoryMessageStore, MessageRecord, MessageStore, Page, PageCursor, StorageError};
use tokio::sync::Notify;

/// In-memory store whose operations can be made to fail, or to block until released.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryMessageStore,
    pub fail_save: AtomicBool,
    pub fail_count: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_save_batch: AtomicBool,
    pub hold_fetches: AtomicBool,
    /// Makes `fetch_before_cursor` ignore the cursor and return the newest page.
    pub ignore_cursor: AtomicBool,
    pub fetch_entered: Notify,
    pub release_fetch: Notify,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Database(format!("injected {} failure", what)))
        } else {
            Ok(())
        }
    }

    async fn maybe_hold(&self) {
        if self.hold_fetches.load(Ordering::SeqCst) {
            self.fetch_entered.notify_one();
            self.release_fetch.notified().await;
        }
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Page, StorageError> {
        self.maybe_hold().await;
        Self::check(&self.fail_fetch, "fetch")?;
        self.inner.fetch_recent(limit).await
    }

    async fn fetch_before(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Page, StorageError> {
        self.maybe_hold().await;
        Self::check(&self.fail_fetch, "fetch")?;
        self.inner.fetch_before(before, limit).await
    }

    async fn fetch_before_cursor(
        &self,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Page, StorageError> {
        self.maybe_hold().await;
        Self::check(&self.fail_fetch, "fetch")?;
        if self.ignore_cursor.load(Ordering::SeqCst) {
            return self.inner.fetch_recent(limit).await;
        }
        self.inner.fetch_before_cursor(cursor, limit).await
    }

    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        Self::check(&self.fail_fetch, "fetch")?;
        self.inner.fetch_page(limit, offset).await
    }

    async fn save(&self, record: &MessageRecord) -> Result<(), StorageError> {
        Self::check(&self.fail_save, "save")?;
        self.inner.save(record).await
    }

    async fn save_batch(&self, records: &[MessageRecord]) -> Result<(), StorageError> {
        Self::check(&self.fail_save_batch, "save_batch")?;
        self.inner.save_batch(records).await
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Self::check(&self.fail_count, "count")?;
        self.inner.count().await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.inner.clear_all().await
    }
}

pub fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap()
}

/// `n` records one minute apart, oldest first, text = index.
pub fn history(n: usize) -> Vec<MessageRecord> {
    (0..n)
        .map(|i| {
            let text = i.to_string();
            let record = if i % 3 == 0 {
                MessageRecord::incoming(Some(text), "1", "John Doe")
            } else {
                MessageRecord::outgoing(text)
            };
            record.with_timestamp(base() + Duration::minutes(i as i64))
        })
        .collect()
}

pub fn ids(messages: &[MessageRecord]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}

pub fn is_strictly_ascending(messages: &[MessageRecord]) -> bool {
    messages.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}
