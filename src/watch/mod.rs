//! The watch loop and its collaborators.
//!
//! Polls a single product page at a fixed interval and fires notifications
//! exactly once per out-of-stock → in-stock transition, de-duplicated
//! through a persisted JSON state file.

pub(crate) mod clock;
pub(crate) mod config;
pub(crate) mod loop_impl;
pub(crate) mod state;

pub use clock::{Clock, SystemClock};
pub use config::{parse_duration, WatchConfig, WatchTarget};
pub use loop_impl::run_watch_loop;
pub use state::{PersistedState, StateDocument, StateStore};
