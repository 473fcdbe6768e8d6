//! Persisted-state store backing restock de-duplication.
//!
//! The store owns a small JSON document on disk, keyed by
//! [`WatchTarget::key`](super::WatchTarget::key). Loading fails softly:
//! a missing, corrupt, or unreadable file is a normal first-run condition
//! and degrades to the default state. Saving is atomic enough for a crash
//! mid-write (write to a `.tmp` sibling, then rename), and a failed save
//! only risks one duplicate alert on the next cycle.

use crate::error::WatchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Last known stock state for one watch target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Last observed purchasability; absent/first run reads as `false`.
    #[serde(default)]
    pub last_in_stock: bool,
    /// When the target was last probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Reason string from the most recent probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reason: Option<String>,
}

/// The whole on-disk document: a map of target key → state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDocument {
    entries: BTreeMap<String, PersistedState>,
}

impl StateDocument {
    /// Look up the state for a target key; absent entries read as the
    /// default (never seen in stock).
    pub fn entry(&self, key: &str) -> PersistedState {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub fn set_entry(&mut self, key: &str, state: PersistedState) {
        self.entries.insert(key.to_string(), state);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed state store. Assumes a single process instance; concurrent
/// writers are not supported.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. Never errors: missing file means first run,
    /// and a corrupt file is logged and treated the same way.
    pub fn load(&self) -> StateDocument {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no state file at {}; first run", self.path.display());
                return StateDocument::default();
            }
            Err(e) => {
                tracing::warn!("cannot read state file {}: {e}", self.path.display());
                return StateDocument::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "state file {} is corrupt ({e}); starting from default state",
                    self.path.display()
                );
                StateDocument::default()
            }
        }
    }

    /// Persist the document: serialize to `<path>.tmp`, then rename over
    /// the real path so a crash mid-write never leaves an unloadable file.
    pub fn save(&self, doc: &StateDocument) -> Result<(), WatchError> {
        let raw = serde_json::to_string_pretty(doc).map_err(|e| WatchError::State {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        std::fs::write(&tmp, raw).map_err(|source| WatchError::State {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| WatchError::State {
            path: self.path.clone(),
            source,
        })
    }
}
