//! A bounded, oldest-first batch of records plus the cursors that delimit it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageRecord;

/// Position of a stored record in the total order `(timestamp, seq)`.
///
/// `seq` is the insertion sequence assigned by the store and breaks timestamp ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageCursor {
    pub timestamp: DateTime<Utc>,
    pub seq: i64,
}

/// Records returned by one fetch, ascending by `(timestamp, seq)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub messages: Vec<MessageRecord>,
    /// Cursor of `messages[0]`; the exclusive bound for the next backward fetch.
    pub oldest: Option<PageCursor>,
    /// Cursor of the last message.
    pub newest: Option<PageCursor>,
}

impl Page {
    /// Builds a page from rows fetched newest-first, reversing them to oldest-first.
    pub fn from_newest_first(mut rows: Vec<(i64, MessageRecord)>) -> Self {
        rows.reverse();
        let cursor_of = |(seq, record): &(i64, MessageRecord)| PageCursor {
            timestamp: record.timestamp,
            seq: *seq,
        };
        let oldest = rows.first().map(cursor_of);
        let newest = rows.last().map(cursor_of);
        Self {
            messages: rows.into_iter().map(|(_, record)| record).collect(),
            oldest,
            newest,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
