//! Integration tests for [`chat_session::SessionController`] paging.
//!
//! Uses the in-memory store (and one SQLite temp file) so every property runs fast.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chat_session::{LoadOutcome, SeedOutcome, SessionController, SessionError, SessionOptions};
use common::{history, ids, is_strictly_ascending, FlakyStore};
use storage::{InMemoryMessageStore, MessageRecord, MessageStore, SqliteMessageStore};

fn controller<S: MessageStore>(store: S, page_size: usize) -> SessionController<S> {
    SessionController::with_options(
        Arc::new(store),
        SessionOptions {
            page_size,
            seed_count: 1000,
        },
    )
}

/// **Test: The seeded 1000-message scenario, page by page.**
///
/// **Setup:** Empty store, `page_size = 20`.
/// **Action:** `ensure_seeded`, `load_initial`, then `load_more` until exhausted.
/// **Expected:** 20 newest first; 40 after one `load_more`; after 49 more calls
/// `has_more` is false with all 1000 loaded once, ascending.
#[tokio::test]
async fn test_seeded_store_drains_in_pages_of_twenty() {
    let session = controller(InMemoryMessageStore::new(), 20);

    assert_eq!(session.ensure_seeded().await, SeedOutcome::Seeded(1000));
    assert_eq!(session.load_initial().await, LoadOutcome::Loaded(20));

    let all = session.store().fetch_page(1000, 0).await.unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 20);
    assert_eq!(ids(&snapshot.messages), ids(&all[980..]));
    assert!(snapshot.has_more);
    assert_eq!(snapshot.total_count, 1000);

    assert_eq!(session.load_more().await, LoadOutcome::Loaded(20));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 40);
    assert_eq!(ids(&snapshot.messages[..20]), ids(&all[960..980]));
    assert!(snapshot.has_more);

    for _ in 0..49 {
        session.load_more().await;
    }

    let snapshot = session.snapshot();
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.messages.len(), 1000);
    assert!(is_strictly_ascending(&snapshot.messages));
    assert_eq!(ids(&snapshot.messages), ids(&all));
    assert_eq!(session.load_more().await, LoadOutcome::Skipped);
}

/// **Test: Same drain against SQLite, with a page size that does not divide the total.**
#[tokio::test]
async fn test_sqlite_drain_without_gaps_or_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.db");
    let store = SqliteMessageStore::new(path.to_str().unwrap()).await.unwrap();
    store.save_batch(&history(95)).await.unwrap();
    let session = controller(store, 20);

    session.load_initial().await;
    while session.can_load_more() {
        session.load_more().await;
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 95);
    assert_eq!(ids(&snapshot.messages), ids(&history_ids_source(&session).await));
    let unique: HashSet<_> = snapshot.messages.iter().map(|m| m.id.clone()).collect();
    assert_eq!(unique.len(), 95);
    assert!(is_strictly_ascending(&snapshot.messages));
}

async fn history_ids_source<S: MessageStore>(session: &SessionController<S>) -> Vec<MessageRecord> {
    session.store().fetch_page(usize::MAX, 0).await.unwrap()
}

/// **Test: Exactly one page in the store means no more pages.**
#[tokio::test]
async fn test_exact_page_has_no_more() {
    let store = InMemoryMessageStore::new();
    store.save_batch(&history(20)).await.unwrap();
    let session = controller(store, 20);

    assert_eq!(session.load_initial().await, LoadOutcome::Loaded(20));
    let snapshot = session.snapshot();
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.total_count, 20);
    assert_eq!(session.load_more().await, LoadOutcome::Skipped);
}

/// **Test: Empty store loads nothing and stops pagination.**
#[tokio::test]
async fn test_empty_store() {
    let session = controller(InMemoryMessageStore::new(), 20);

    assert_eq!(session.load_initial().await, LoadOutcome::Loaded(0));
    let snapshot = session.snapshot();
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.total_count, 0);
}

/// **Test: load_more before any load is a no-op.**
#[tokio::test]
async fn test_load_more_without_cursor_is_skipped() {
    let store = InMemoryMessageStore::new();
    store.save_batch(&history(50)).await.unwrap();
    let session = controller(store, 20);

    assert!(session.snapshot().has_more);
    assert_eq!(session.load_more().await, LoadOutcome::Skipped);
    assert_eq!(session.loaded_count(), 0);
}

/// **Test: ensure_seeded is idempotent, within one controller and across controllers.**
#[tokio::test]
async fn test_ensure_seeded_is_idempotent() {
    let store = Arc::new(InMemoryMessageStore::new());
    let session = SessionController::new(store.clone());

    assert_eq!(session.ensure_seeded().await, SeedOutcome::Seeded(1000));
    assert_eq!(store.count().await.unwrap(), 1000);

    assert_eq!(session.ensure_seeded().await, SeedOutcome::AlreadySeeded);
    assert_eq!(store.count().await.unwrap(), 1000);

    let second = SessionController::new(store.clone());
    assert_eq!(second.ensure_seeded().await, SeedOutcome::AlreadySeeded);
    assert_eq!(store.count().await.unwrap(), 1000);
}

/// **Test: A store that already has messages is never seeded.**
#[tokio::test]
async fn test_ensure_seeded_skips_non_empty_store() {
    let store = InMemoryMessageStore::new();
    store.save(&MessageRecord::outgoing("first")).await.unwrap();
    let session = controller(store, 20);

    assert_eq!(session.ensure_seeded().await, SeedOutcome::AlreadySeeded);
    assert_eq!(session.store().count().await.unwrap(), 1);
}

/// **Test: A failed seed is swallowed; bootstrap still loads an empty store.**
#[tokio::test]
async fn test_seed_failure_leaves_store_empty() {
    let store = FlakyStore::new();
    FlakyStore::set(&store.fail_save_batch, true);
    let session = controller(store, 20);

    assert!(matches!(session.ensure_seeded().await, SeedOutcome::Failed(_)));
    assert_eq!(session.bootstrap().await, LoadOutcome::Loaded(0));
    assert!(session.snapshot().messages.is_empty());
}

/// **Test: A seed count too large to place in time fails without touching the store.**
#[tokio::test]
async fn test_unrepresentable_seed_count_fails() {
    let store = InMemoryMessageStore::new();
    let session = SessionController::with_options(
        Arc::new(store),
        SessionOptions {
            page_size: 20,
            seed_count: usize::MAX,
        },
    );

    assert!(matches!(
        session.ensure_seeded().await,
        SeedOutcome::Failed(SessionError::Seed(_))
    ));
    assert_eq!(session.store().count().await.unwrap(), 0);
}

/// **Test: bootstrap seeds then shows the newest page.**
#[tokio::test]
async fn test_bootstrap_seeds_and_loads() {
    let session = controller(InMemoryMessageStore::new(), 25);

    assert_eq!(session.bootstrap().await, LoadOutcome::Loaded(25));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.total_count, 1000);
    assert!(snapshot.has_more);
}

/// **Test: load_initial failure leaves the view empty and not loading.**
#[tokio::test]
async fn test_load_initial_failure_is_swallowed() {
    let store = FlakyStore::new();
    store.inner.save_batch(&history(30)).await.unwrap();
    FlakyStore::set(&store.fail_fetch, true);
    let session = controller(store, 10);

    assert!(matches!(session.load_initial().await, LoadOutcome::Failed(_)));
    let snapshot = session.snapshot();
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.is_loading);
    assert!(!session.is_loading());
}

/// **Test: load_more failure leaves the view exactly as it was.**
#[tokio::test]
async fn test_load_more_failure_keeps_state() {
    let store = Arc::new(FlakyStore::new());
    store.inner.save_batch(&history(30)).await.unwrap();
    let session = SessionController::with_options(
        store.clone(),
        SessionOptions {
            page_size: 10,
            seed_count: 0,
        },
    );
    session.load_initial().await;
    let before = session.snapshot();

    FlakyStore::set(&store.fail_fetch, true);
    assert!(matches!(session.load_more().await, LoadOutcome::Failed(_)));
    assert_eq!(session.snapshot(), before);

    FlakyStore::set(&store.fail_fetch, false);
    assert_eq!(session.load_more().await, LoadOutcome::Loaded(10));
    assert_eq!(session.loaded_count(), 20);
}

/// **Test: A page that is not older than the loaded history is discarded.**
///
/// **Setup:** 30 messages, first page of 10 loaded; the store then answers
/// `fetch_before_cursor` with the newest page again.
/// **Action:** `load_more`.
/// **Expected:** `Skipped`; the view is exactly as before and the flag is released.
#[tokio::test]
async fn test_overlapping_page_is_discarded() {
    let store = Arc::new(FlakyStore::new());
    store.inner.save_batch(&history(30)).await.unwrap();
    let session = SessionController::with_options(
        store.clone(),
        SessionOptions {
            page_size: 10,
            seed_count: 0,
        },
    );
    session.load_initial().await;
    let before = session.snapshot();

    FlakyStore::set(&store.ignore_cursor, true);
    assert_eq!(session.load_more().await, LoadOutcome::Skipped);
    assert_eq!(session.snapshot(), before);
    assert!(!session.is_loading());

    FlakyStore::set(&store.ignore_cursor, false);
    assert_eq!(session.load_more().await, LoadOutcome::Loaded(10));
    assert!(is_strictly_ascending(&session.snapshot().messages));
}

/// **Test: Default options come from the shared configuration defaults.**
#[test]
fn test_default_options_match_config_defaults() {
    let options = SessionOptions::default();
    assert_eq!(options.page_size, chat_core::DEFAULT_PAGE_SIZE);
    assert_eq!(options.seed_count, chat_core::DEFAULT_SEED_COUNT);
}

/// **Test: Records sharing one timestamp are paged without gaps or duplicates.**
#[tokio::test]
async fn test_pagination_across_timestamp_ties() {
    let store = InMemoryMessageStore::new();
    let ts = common::base();
    let tied: Vec<MessageRecord> = (0..30)
        .map(|i| MessageRecord::outgoing(i.to_string()).with_timestamp(ts))
        .collect();
    store.save_batch(&tied).await.unwrap();
    let session = controller(store, 7);

    session.load_initial().await;
    while session.can_load_more() {
        session.load_more().await;
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 30);
    assert_eq!(ids(&snapshot.messages), ids(&tied));
}

/// **Test: Page size changes clamp to 1 and apply to the next load.**
#[tokio::test]
async fn test_update_page_size_and_refresh() {
    let store = InMemoryMessageStore::new();
    store.save_batch(&history(10)).await.unwrap();
    let session = controller(store, 20);

    session.update_page_size(0).await;
    assert_eq!(session.snapshot().page_size, 1);

    session.update_page_size(3).await;
    assert_eq!(session.refresh().await, LoadOutcome::Loaded(3));
    assert!(session.snapshot().has_more);

    session.load_more().await;
    assert_eq!(session.loaded_count(), 6);

    assert_eq!(session.refresh().await, LoadOutcome::Loaded(3));
    assert_eq!(session.loaded_count(), 3);
}

/// **Test: clear_history empties the store and the view.**
#[tokio::test]
async fn test_clear_history() {
    let store = InMemoryMessageStore::new();
    store.save_batch(&history(40)).await.unwrap();
    let session = controller(store, 20);
    session.load_initial().await;

    session.clear_history().await.unwrap();

    let snapshot = session.snapshot();
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.total_count, 0);
    assert!(!snapshot.has_more);
    assert_eq!(session.store().count().await.unwrap(), 0);
}

/// **Test: Display style follows the author.**
#[tokio::test]
async fn test_configure_for_loaded_messages() {
    let store = InMemoryMessageStore::new();
    store.save_batch(&history(3)).await.unwrap();
    let session = controller(store, 20);
    session.load_initial().await;

    let styles: Vec<_> = session
        .snapshot()
        .messages
        .iter()
        .map(|m| session.configure_for_message(m))
        .collect();
    assert_eq!(
        styles,
        vec![
            chat_session::MessageStyle::Incoming,
            chat_session::MessageStyle::Outgoing,
            chat_session::MessageStyle::Outgoing,
        ]
    );
}
