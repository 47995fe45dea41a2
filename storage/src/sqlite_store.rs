//! SQLite message store: persistence and paged queries for messages.
//!
//! Uses SqlitePoolManager and the models (MessageRecord, Page, PageCursor).
//! Timestamps are stored as integer microseconds so ordering is numeric, and
//! `seq` (an autoincrement key) breaks ties between equal timestamps.
//!
//! ```sql
//! CREATE TABLE messages (
//!     seq INTEGER PRIMARY KEY AUTOINCREMENT,
//!     id TEXT NOT NULL UNIQUE,
//!     text TEXT,
//!     image_ref TEXT,
//!     timestamp INTEGER NOT NULL,
//!     is_from_self INTEGER NOT NULL,
//!     author_id TEXT,
//!     author_display_name TEXT
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{MessageRecord, Page, PageCursor};
use crate::sqlite_pool::SqlitePoolManager;
use crate::store::MessageStore;

const SELECT_COLUMNS: &str =
    "SELECT seq, id, text, image_ref, timestamp, is_from_self, author_id, author_display_name FROM messages";

const INSERT_MESSAGE: &str = r#"
    INSERT INTO messages (id, text, image_ref, timestamp, is_from_self, author_id, author_display_name)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

#[derive(Clone)]
pub struct SqliteMessageStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteMessageStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                text TEXT,
                image_ref TEXT,
                timestamp INTEGER NOT NULL,
                is_from_self INTEGER NOT NULL,
                author_id TEXT,
                author_display_name TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_timestamp_seq ON messages(timestamp, seq);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }

    fn row_to_record(row: &SqliteRow) -> Result<(i64, MessageRecord), StorageError> {
        let seq: i64 = row.try_get("seq")?;
        let micros: i64 = row.try_get("timestamp")?;
        let timestamp = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
            StorageError::Encoding(format!("timestamp out of range: {}", micros))
        })?;

        let record = MessageRecord {
            id: row.try_get("id")?,
            text: row.try_get("text")?,
            image_ref: row.try_get("image_ref")?,
            timestamp,
            is_from_self: row.try_get("is_from_self")?,
            author_id: row.try_get("author_id")?,
            author_display_name: row.try_get("author_display_name")?,
        };
        Ok((seq, record))
    }

    fn rows_to_page(rows: &[SqliteRow]) -> Result<Page, StorageError> {
        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::from_newest_first(records))
    }

    fn bind_insert<'q>(
        message: &'q MessageRecord,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        sqlx::query(INSERT_MESSAGE)
            .bind(&message.id)
            .bind(&message.text)
            .bind(&message.image_ref)
            // Truncates any sub-microsecond part.
            .bind(message.timestamp_micros())
            .bind(message.is_from_self)
            .bind(&message.author_id)
            .bind(&message.author_display_name)
    }

    /// Smallest stored microsecond value not below `bound`. Rows hold whole
    /// microseconds, so `timestamp < ceil(bound)` is exactly `timestamp < bound`.
    fn micros_ceil(bound: DateTime<Utc>) -> i64 {
        let micros = bound.timestamp_micros();
        if bound.timestamp_subsec_nanos() % 1_000 == 0 {
            micros
        } else {
            micros.saturating_add(1)
        }
    }

    /// `(timestamp, seq)` bounds for the cursor predicate. A cursor between two
    /// microseconds has no stored ties, so the seq bound excludes all of them.
    fn cursor_bound(cursor: PageCursor) -> (i64, i64) {
        let micros = Self::micros_ceil(cursor.timestamp);
        if micros == cursor.timestamp.timestamp_micros() {
            (micros, cursor.seq)
        } else {
            (micros, i64::MIN)
        }
    }

    fn sql_limit(limit: usize) -> i64 {
        i64::try_from(limit).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Page, StorageError> {
        let pool = self.pool_manager.pool();

        let sql = format!("{} ORDER BY timestamp DESC, seq DESC LIMIT ?", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(Self::sql_limit(limit))
            .fetch_all(pool)
            .await?;

        let page = Self::rows_to_page(&rows)?;
        debug!("Fetched {} recent messages (limit {})", page.len(), limit);
        Ok(page)
    }

    async fn fetch_before(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Page, StorageError> {
        let pool = self.pool_manager.pool();

        let sql = format!(
            "{} WHERE timestamp < ? ORDER BY timestamp DESC, seq DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(Self::micros_ceil(before))
            .bind(Self::sql_limit(limit))
            .fetch_all(pool)
            .await?;

        let page = Self::rows_to_page(&rows)?;
        debug!("Fetched {} messages before {}", page.len(), before);
        Ok(page)
    }

    async fn fetch_before_cursor(
        &self,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Page, StorageError> {
        let pool = self.pool_manager.pool();
        let (micros, seq) = Self::cursor_bound(cursor);

        let sql = format!(
            "{} WHERE timestamp < ? OR (timestamp = ? AND seq < ?) \
             ORDER BY timestamp DESC, seq DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(micros)
            .bind(micros)
            .bind(seq)
            .bind(Self::sql_limit(limit))
            .fetch_all(pool)
            .await?;

        let page = Self::rows_to_page(&rows)?;
        debug!(
            "Fetched {} messages before cursor ({}, {})",
            page.len(),
            cursor.timestamp,
            cursor.seq
        );
        Ok(page)
    }

    async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let sql = format!("{} ORDER BY timestamp ASC, seq ASC LIMIT ? OFFSET ?", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(Self::sql_limit(limit))
            .bind(Self::sql_limit(offset))
            .fetch_all(pool)
            .await?;

        let messages = rows
            .iter()
            .map(|row| Self::row_to_record(row).map(|(_, record)| record))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Retrieved {} messages at offset {}", messages.len(), offset);
        Ok(messages)
    }

    async fn save(&self, message: &MessageRecord) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        Self::bind_insert(message).execute(pool).await?;

        info!("Saved message: id={}", message.id);
        Ok(())
    }

    async fn save_batch(&self, messages: &[MessageRecord]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        for message in messages {
            Self::bind_insert(message).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!("Saved batch of {} messages", messages.len());
        Ok(())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let pool = self.pool_manager.pool();

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await?;

        usize::try_from(total.0)
            .map_err(|e| StorageError::Encoding(format!("negative count {}: {}", total.0, e)))
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let result = sqlx::query("DELETE FROM messages").execute(&mut *tx).await?;

        tx.commit().await?;

        info!("Deleted all {} messages", result.rows_affected());
        Ok(())
    }
}
