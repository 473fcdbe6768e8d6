//! Error taxonomy for restock-watch.
//!
//! Configuration and startup errors are the only fatal class: they surface
//! through `anyhow` in `main` and terminate the process with a non-zero
//! exit code before the watch loop starts. Everything that can go wrong
//! inside a polling cycle (render failures, state-file I/O, notification
//! delivery) is isolated by the loop and must never propagate out of it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the watcher.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WatchError {
    /// Invalid or incomplete configuration (fatal at startup).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed polling interval string.
    #[error("invalid interval '{0}': expected a positive duration like 30s, 3m, 1h")]
    InvalidInterval(String),

    /// Malformed or unsupported product URL.
    #[error("invalid product URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// State file could not be written. The loop logs this and carries on;
    /// the only consequence is a possible duplicate alert on the next cycle.
    #[error("cannot write state file {}: {source}", path.display())]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenient Result alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = WatchError::Config("email enabled but SMTP_HOST is missing".to_string());
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("SMTP_HOST"));
    }

    #[test]
    fn test_invalid_interval_display() {
        let err = WatchError::InvalidInterval("10x".to_string());
        assert!(err.to_string().contains("'10x'"));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_invalid_url_display() {
        let err = WatchError::InvalidUrl {
            url: "ftp://shop".to_string(),
            reason: "scheme must be http or https".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ftp://shop"));
        assert!(msg.contains("scheme"));
    }

    #[test]
    fn test_state_error_carries_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = WatchError::State {
            path: PathBuf::from("/var/state.json"),
            source: io,
        };
        assert!(err.to_string().contains("/var/state.json"));
    }
}
