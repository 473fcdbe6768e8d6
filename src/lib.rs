//! **Edge-triggered restock watcher for retail product pages.**
//!
//! `restock-watch` polls a single product page in a headless browser,
//! determines whether a targeted (or any) color/size variant is purchasable,
//! and delivers a notification exactly once per out-of-stock → in-stock
//! transition. De-duplication is backed by a small JSON state file, so
//! restarting the watcher never re-alerts for a variant that is already
//! known to be in stock.
//!
//! ## Core Concepts & Modules
//!
//! - **[`probe`]**: the availability prober. The page-rendering collaborator
//!   is hidden behind the [`probe::Renderer`] / [`probe::PageSession`] traits
//!   so the stock decision logic is testable without a browser; the concrete
//!   implementation drives headless Chrome.
//! - **[`notify`]**: pluggable notification transports behind the
//!   [`notify::Notifier`] trait. Ships email (SMTP) and webhook (Discord
//!   compatible) variants; adding a transport never touches the watch loop.
//! - **[`watch`]**: the watch loop itself, plus the persisted-state store
//!   and the injectable [`watch::Clock`] used for deterministic tests.
//! - **[`config`]**: transport configuration assembled from the environment.
//! - **[`error`]**: the error taxonomy. Only configuration/startup errors
//!   terminate the process; every per-cycle failure is isolated.
//!
//! ## Operational model
//!
//! One cycle runs fully to completion (probe, decide, notify, persist, log)
//! before the interval sleep begins. Exactly one probe is in flight at a
//! time. The state file is owned by a single process instance; running two
//! watchers against the same state file is not supported.

#![warn(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod notify;
pub mod probe;
pub mod watch;

pub use config::{EmailConfig, NotifyConfig};
pub use error::{Result, WatchError};
pub use notify::{build_notifiers, Notifier, RestockEvent};
pub use probe::{ProbeResult, Prober, StockProber};
pub use watch::{
    parse_duration, run_watch_loop, Clock, PersistedState, StateStore, SystemClock, WatchConfig,
    WatchTarget,
};
