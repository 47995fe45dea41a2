//! # Session Controller
//!
//! Single owner of the in-memory chat view. Pages backward through the store
//! with a `(timestamp, seq)` cursor, appends sends optimistically and rolls them
//! back when persistence fails.
//!
//! ## Concurrency
//!
//! State lives behind one async mutex that is never held across a store call.
//! `is_loading` is a cooperative flag: `load_initial`, `load_more` and
//! `clear_history` claim it with a compare-and-swap and release it through a
//! drop guard on every exit path, including cancellation. Overlapping calls are
//! dropped, not queued. `send` ignores the flag and may interleave freely.
//!
//! No call has a timeout or retries; a hung store call keeps `is_loading` set.
//! Wrap calls in `tokio::time::timeout` where that matters.
//!
//! ## Known staleness
//!
//! `load_initial` reads the count and the newest page in two calls. A `send`
//! landing in between can make `has_more` wrong for that one page, and the
//! freshly loaded page replaces the view, so such a send may only appear after
//! the next reload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_core::{DEFAULT_PAGE_SIZE, DEFAULT_SEED_COUNT};
use chrono::Utc;
use storage::{MessageRecord, MessageStore, StorageError};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SessionError};
use crate::events::{SessionEvent, SessionEvents};
use crate::state::{SessionSnapshot, SessionState};
use crate::style::{configure_for_message, MessageStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Clamped to at least 1.
    pub page_size: usize,
    /// Messages written by `ensure_seeded` into an empty store.
    pub seed_count: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            seed_count: DEFAULT_SEED_COUNT,
        }
    }
}

/// Result of a page load. Failures are already logged; state is left as the
/// operation's contract describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// Another load was in flight, there was nothing older to fetch, or the
    /// fetched page overlapped what is loaded and was discarded.
    Skipped,
    Failed(StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadySeeded,
    Failed(SessionError),
}

/// Clears `is_loading` and republishes it when dropped.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
    snapshot_tx: &'a watch::Sender<SessionSnapshot>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        let flag = self.flag;
        self.snapshot_tx
            .send_modify(|snapshot| snapshot.is_loading = flag.load(Ordering::SeqCst));
    }
}

pub struct SessionController<S: MessageStore + ?Sized = dyn MessageStore> {
    store: Arc<S>,
    state: Mutex<SessionState>,
    is_loading: AtomicBool,
    /// Held across the whole seeding check so concurrent callers seed once.
    is_seeded: Mutex<bool>,
    seed_count: usize,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    events: SessionEvents,
}

impl<S: MessageStore + ?Sized> SessionController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, SessionOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: SessionOptions) -> Self {
        let state = SessionState::new(options.page_size);
        let (snapshot_tx, _) = watch::channel(state.snapshot(false));
        Self {
            store,
            state: Mutex::new(state),
            is_loading: AtomicBool::new(false),
            is_seeded: Mutex::new(false),
            seed_count: options.seed_count,
            snapshot_tx,
            events: SessionEvents::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Loads the newest page, replacing whatever was loaded.
    ///
    /// `has_more` is set only when the page came back full and the store holds
    /// more than one page. Emits [`SessionEvent::ScrollToLatest`] on success.
    /// On failure the view stays empty.
    pub async fn load_initial(&self) -> LoadOutcome {
        let (_guard, page_size) = {
            let mut state = self.state.lock().await;
            let Some(guard) = self.begin_loading() else {
                debug!("load_initial skipped: a load is already in progress");
                return LoadOutcome::Skipped;
            };
            state.reset_loaded();
            self.publish(&state);
            (guard, state.page_size)
        };

        let total = match self.store.count().await {
            Ok(total) => total,
            Err(e) => {
                error!(error = %e, "Error loading initial messages: count failed");
                return LoadOutcome::Failed(e);
            }
        };
        {
            let mut state = self.state.lock().await;
            state.total_count = total;
            self.publish(&state);
        }

        let page = match self.store.fetch_recent(page_size).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "Error loading initial messages");
                return LoadOutcome::Failed(e);
            }
        };

        let loaded = page.len();
        {
            let mut state = self.state.lock().await;
            state.apply_initial(page, page_size);
            info!(
                loaded,
                total,
                has_more = state.has_more,
                "Loaded initial messages"
            );
            self.publish(&state);
        }
        self.events.emit(SessionEvent::ScrollToLatest);
        LoadOutcome::Loaded(loaded)
    }

    /// Fetches the page just older than the oldest loaded message and prepends it.
    ///
    /// Skipped while loading, when `has_more` is false, or before anything was
    /// loaded. An empty page ends pagination for this session. On failure, or
    /// when the store returns a page that is not strictly older than the loaded
    /// history, the view is unchanged.
    pub async fn load_more(&self) -> LoadOutcome {
        let (_guard, cursor, page_size) = {
            let state = self.state.lock().await;
            let Some(cursor) = state.oldest_loaded.filter(|_| state.has_more) else {
                debug!(has_more = state.has_more, "load_more skipped: nothing older to load");
                return LoadOutcome::Skipped;
            };
            let Some(guard) = self.begin_loading() else {
                debug!("load_more skipped: a load is already in progress");
                return LoadOutcome::Skipped;
            };
            self.publish(&state);
            (guard, cursor, state.page_size)
        };

        let page = match self.store.fetch_before_cursor(cursor, page_size).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "Error loading more messages");
                return LoadOutcome::Failed(e);
            }
        };

        let fetched = page.len();
        let mut state = self.state.lock().await;
        if !state.prepend_older(page, page_size) {
            warn!(fetched, "Fetched page overlaps loaded history; discarding it");
            return LoadOutcome::Skipped;
        }
        debug!(
            fetched,
            loaded = state.messages.len(),
            has_more = state.has_more,
            "Loaded older messages"
        );
        self.publish(&state);
        LoadOutcome::Loaded(fetched)
    }

    /// Sends a message authored by the local user.
    ///
    /// The message is appended and counted before it is persisted. If `save`
    /// fails it is removed again, [`SessionEvent::SendFailed`] is emitted and the
    /// error returned. Not retried.
    pub async fn send(&self, text: impl Into<String>) -> Result<MessageRecord> {
        let record = {
            let mut state = self.state.lock().await;
            // Stamped under the lock so concurrent sends append in time order.
            let record = MessageRecord::outgoing(text);
            state.push_sent(record.clone());
            self.publish(&state);
            record
        };
        self.events.emit(SessionEvent::ScrollToLatest);

        if let Err(e) = self.store.save(&record).await {
            let removed = {
                let mut state = self.state.lock().await;
                let removed = state.rollback_sent(&record.id);
                self.publish(&state);
                removed
            };
            warn!(id = %record.id, removed, error = %e, "Error saving message; rolled back");
            self.events.emit(SessionEvent::SendFailed {
                id: record.id.clone(),
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        debug!(id = %record.id, "Message persisted");
        Ok(record)
    }

    /// Writes the synthetic history into the store if it is empty.
    ///
    /// Only the first successful call in a controller's lifetime does any work.
    /// Failures are logged and leave the store unseeded.
    pub async fn ensure_seeded(&self) -> SeedOutcome {
        let mut seeded = self.is_seeded.lock().await;
        if *seeded {
            return SeedOutcome::AlreadySeeded;
        }

        let existing = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "Error seeding store: count failed");
                return SeedOutcome::Failed(e.into());
            }
        };
        if existing > 0 {
            debug!(existing, "Store already has messages; not seeding");
            *seeded = true;
            return SeedOutcome::AlreadySeeded;
        }

        let records = match seed_messages::generate_messages(self.seed_count, Utc::now()) {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Error generating seed messages");
                return SeedOutcome::Failed(SessionError::Seed(e.to_string()));
            }
        };

        match self.store.save_batch(&records).await {
            Ok(()) => {
                *seeded = true;
                info!(count = records.len(), "Seeded empty message store");
                SeedOutcome::Seeded(records.len())
            }
            Err(e) => {
                error!(error = %e, "Error seeding store");
                SeedOutcome::Failed(e.into())
            }
        }
    }

    /// Seeds an empty store, then loads the newest page.
    pub async fn bootstrap(&self) -> LoadOutcome {
        self.ensure_seeded().await;
        self.load_initial().await
    }

    /// Rebuilds the view from the newest page.
    pub async fn refresh(&self) -> LoadOutcome {
        self.load_initial().await
    }

    /// Deletes the whole history and empties the view.
    pub async fn clear_history(&self) -> Result<()> {
        let _guard = {
            let state = self.state.lock().await;
            let Some(guard) = self.begin_loading() else {
                return Err(SessionError::Busy);
            };
            self.publish(&state);
            guard
        };

        if let Err(e) = self.store.clear_all().await {
            error!(error = %e, "Error clearing message history");
            return Err(e.into());
        }

        let mut state = self.state.lock().await;
        state.clear();
        self.publish(&state);
        info!("Cleared message history");
        Ok(())
    }

    /// Sets the page size for subsequent loads (minimum 1).
    pub async fn update_page_size(&self, page_size: usize) {
        let mut state = self.state.lock().await;
        state.set_page_size(page_size);
        self.publish(&state);
    }

    pub fn configure_for_message(&self, record: &MessageRecord) -> MessageStyle {
        configure_for_message(record)
    }

    /// The latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    pub fn can_load_more(&self) -> bool {
        self.snapshot_tx.borrow().has_more && !self.is_loading()
    }

    pub fn loaded_count(&self) -> usize {
        self.snapshot_tx.borrow().messages.len()
    }

    fn begin_loading(&self) -> Option<LoadingGuard<'_>> {
        self.is_loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LoadingGuard {
                flag: &self.is_loading,
                snapshot_tx: &self.snapshot_tx,
            })
    }

    /// Publishes `state`. `is_loading` is read inside the channel lock so a
    /// concurrent guard release is never overwritten by a stale value.
    fn publish(&self, state: &SessionState) {
        let is_loading = &self.is_loading;
        self.snapshot_tx
            .send_modify(|snapshot| *snapshot = state.snapshot(is_loading.load(Ordering::SeqCst)));
    }
}
