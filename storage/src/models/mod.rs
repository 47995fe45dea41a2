mod message_record;
mod page;

pub use message_record::MessageRecord;
pub use page::{Page, PageCursor};
