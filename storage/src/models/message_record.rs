//! Message record model for persistence.
//!
//! Maps to the `messages` table. Field names are the stable serialized layout.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chat message. Records are never edited; a new message gets a new id.
///
/// Timestamps are kept at microsecond precision, the resolution the SQLite
/// store persists. The constructors truncate, and both stores truncate again on
/// write, so a record built field by field reads back at microsecond precision
/// from either store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub text: Option<String>,
    pub image_ref: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_from_self: bool,
    /// Only set when `is_from_self` is false.
    pub author_id: Option<String>,
    /// Only set when `is_from_self` is false.
    pub author_display_name: Option<String>,
}

impl MessageRecord {
    /// Creates a message authored by the local user, with a generated UUID and current timestamp.
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: Some(text.into()),
            image_ref: None,
            timestamp: Self::normalize(Utc::now()),
            is_from_self: true,
            author_id: None,
            author_display_name: None,
        }
    }

    /// Creates a message received from another author, with a generated UUID and current timestamp.
    pub fn incoming(
        text: Option<String>,
        author_id: impl Into<String>,
        author_display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            image_ref: None,
            timestamp: Self::normalize(Utc::now()),
            is_from_self: false,
            author_id: Some(author_id.into()),
            author_display_name: Some(author_display_name.into()),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Self::normalize(timestamp);
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Microseconds since the Unix epoch; the persisted ordering key.
    pub fn timestamp_micros(&self) -> i64 {
        self.timestamp.timestamp_micros()
    }

    pub(crate) fn normalize(timestamp: DateTime<Utc>) -> DateTime<Utc> {
        timestamp.trunc_subsecs(6)
    }
}
