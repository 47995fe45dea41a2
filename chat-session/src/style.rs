//! Per-message display selection.

use serde::{Deserialize, Serialize};
use storage::MessageRecord;

/// Which of the two presentation configurations a message uses. The concrete
/// colors and metrics belong to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStyle {
    /// Authored locally; rendered on the sending side.
    Outgoing,
    Incoming,
}

pub fn configure_for_message(record: &MessageRecord) -> MessageStyle {
    if record.is_from_self {
        MessageStyle::Outgoing
    } else {
        MessageStyle::Incoming
    }
}
