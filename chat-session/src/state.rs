//! Session view state and its published snapshot.
//!
//! [`SessionState`] is only ever touched by the controller, under its lock.
//! Every mutation here is synchronous; the controller does the store I/O.

use serde::Serialize;
use storage::{MessageRecord, Page, PageCursor};

/// Immutable copy of the session state, published to observers after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Oldest first; the newest message is last.
    pub messages: Vec<MessageRecord>,
    pub has_more: bool,
    pub is_loading: bool,
    pub total_count: usize,
    pub page_size: usize,
}

impl SessionSnapshot {
    pub fn loaded_count(&self) -> usize {
        self.messages.len()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pub(crate) messages: Vec<MessageRecord>,
    /// Cursor of `messages[0]` as last loaded from the store.
    pub(crate) oldest_loaded: Option<PageCursor>,
    pub(crate) has_more: bool,
    /// Mirrors the store count; ahead by in-flight sends.
    pub(crate) total_count: usize,
    pub(crate) page_size: usize,
}

impl SessionState {
    pub(crate) fn new(page_size: usize) -> Self {
        Self {
            messages: Vec::new(),
            oldest_loaded: None,
            has_more: true,
            total_count: 0,
            page_size: page_size.max(1),
        }
    }

    pub(crate) fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub(crate) fn reset_loaded(&mut self) {
        self.messages.clear();
        self.oldest_loaded = None;
    }

    /// Installs the newest page. More pages exist only if this one was full and
    /// the store holds more than one page.
    pub(crate) fn apply_initial(&mut self, page: Page, requested: usize) {
        self.has_more = page.len() == requested && self.total_count > requested;
        self.oldest_loaded = page.oldest;
        self.messages = page.messages;
    }

    /// Prepends an older page. Returns false, leaving the state untouched, if the
    /// page is not strictly older than what is loaded.
    pub(crate) fn prepend_older(&mut self, page: Page, requested: usize) -> bool {
        if page.is_empty() {
            self.has_more = false;
            return true;
        }
        if let (Some(newest), Some(oldest)) = (page.newest, self.oldest_loaded) {
            if newest >= oldest {
                return false;
            }
        }

        self.has_more = page.len() == requested;
        self.oldest_loaded = page.oldest;
        let mut merged = page.messages;
        merged.append(&mut self.messages);
        self.messages = merged;
        true
    }

    pub(crate) fn push_sent(&mut self, record: MessageRecord) {
        self.messages.push(record);
        self.total_count += 1;
    }

    /// Undoes [`Self::push_sent`]. The count is only decremented if the record
    /// was still loaded; a reload in between has already recounted the store.
    pub(crate) fn rollback_sent(&mut self, id: &str) -> bool {
        match self.messages.iter().position(|m| m.id == id) {
            Some(index) => {
                self.messages.remove(index);
                self.total_count = self.total_count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.reset_loaded();
        self.has_more = false;
        self.total_count = 0;
    }

    pub(crate) fn snapshot(&self, is_loading: bool) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            has_more: self.has_more,
            is_loading,
            total_count: self.total_count,
            page_size: self.page_size,
        }
    }
}
