//! Watch target, loop configuration, and duration parsing.

use crate::error::WatchError;
use std::path::PathBuf;
use std::time::Duration;

/// The product variant being watched. Constructed once at startup and
/// never mutated.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    /// Product page URL.
    pub url: String,
    /// Desired color name; `None` means any color.
    pub color: Option<String>,
    /// Desired size label; `None` means any size.
    pub size: Option<String>,
    /// Fixed sleep between polling cycles.
    pub poll_interval: Duration,
}

impl WatchTarget {
    /// Stable identity of this target, used to key the state file so the
    /// format stays forward-compatible with watching several variants.
    pub fn key(&self) -> String {
        format!(
            "{} | color={} | size={}",
            self.url,
            self.color.as_deref().unwrap_or("*"),
            self.size.as_deref().unwrap_or("*"),
        )
    }
}

/// Configuration for one watch run.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub target: WatchTarget,
    /// Path of the persisted-state JSON file.
    pub state_file: PathBuf,
    /// Run a single cycle and exit.
    pub once: bool,
    /// Exit (code 0) right after the first restock notification.
    pub exit_on_restock: bool,
    /// Suppress startup summary and per-cycle status lines.
    pub quiet: bool,
}

/// Parse a human-readable duration string into a [`Duration`].
///
/// Supported suffixes: `s` (seconds), `m` (minutes), `h` (hours). The
/// result must be positive; a zero interval would turn the watcher into a
/// hammering loop.
///
/// # Examples
///
/// ```
/// use restock_watch::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("3m").unwrap(), Duration::from_secs(180));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, WatchError> {
    let s = s.trim();
    if s.len() < 2 {
        return Err(WatchError::InvalidInterval(s.to_string()));
    }

    let (num_str, unit) = s.split_at(s.len() - 1);
    let value: u64 = num_str
        .parse()
        .map_err(|_| WatchError::InvalidInterval(s.to_string()))?;

    let duration = match unit {
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value * 60),
        "h" => Duration::from_secs(value * 3600),
        _ => return Err(WatchError::InvalidInterval(s.to_string())),
    };

    if duration.is_zero() {
        return Err(WatchError::InvalidInterval(s.to_string()));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_duration_with_whitespace() {
        assert_eq!(parse_duration("  10s  ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_duration_rejects_zero() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("0m").is_err());
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("abcs").is_err());
    }

    #[test]
    fn test_target_key_with_filters() {
        let target = WatchTarget {
            url: "https://shop.example/p/1".to_string(),
            color: Some("cloud white".to_string()),
            size: Some("M".to_string()),
            poll_interval: Duration::from_secs(180),
        };
        assert_eq!(
            target.key(),
            "https://shop.example/p/1 | color=cloud white | size=M"
        );
    }

    #[test]
    fn test_target_key_wildcards_absent_filters() {
        let target = WatchTarget {
            url: "https://shop.example/p/1".to_string(),
            color: None,
            size: None,
            poll_interval: Duration::from_secs(180),
        };
        assert_eq!(target.key(), "https://shop.example/p/1 | color=* | size=*");
    }
}
