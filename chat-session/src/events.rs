//! Edge-triggered session signals, delivered over a broadcast channel.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The view should scroll to the newest message.
    ScrollToLatest,
    /// An optimistic send was rolled back.
    SendFailed { id: String, reason: String },
}

/// Non-blocking: `emit` never awaits and lagging receivers drop old events.
#[derive(Debug)]
pub(crate) struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Returns the number of receivers that got the event; 0 without subscribers.
    pub(crate) fn emit(&self, event: SessionEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}
