//! # chat-session
//!
//! The paginated session controller: the single owner of the in-memory chat
//! view, mediating every access to a [`storage::MessageStore`].
//!
//! - [`SessionController`] – `load_initial`, `load_more`, `send`, `ensure_seeded`
//! - [`SessionSnapshot`] – observable state, published through a `watch` channel
//! - [`SessionEvent`] – edge-triggered signals (scroll to latest, send failures)
//! - [`MessageStyle`] / [`configure_for_message`] – per-message display selection

mod controller;
mod error;
mod events;
mod state;
mod style;

pub use controller::{LoadOutcome, SeedOutcome, SessionController, SessionOptions};
pub use error::{Result, SessionError};
pub use events::SessionEvent;
pub use state::SessionSnapshot;
pub use style::{configure_for_message, MessageStyle};
