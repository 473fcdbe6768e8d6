//! Notification transports.
//!
//! The watch loop depends only on the [`Notifier`] trait; concrete
//! transports (SMTP email, Discord-compatible webhook) are assembled from
//! configuration by [`build_notifiers`]. Delivery is best-effort: a failed
//! send is logged by the loop and never blocks the cycle or the state
//! update, which means the watcher favors "never notify twice for the same
//! transition" over guaranteed delivery.

pub mod email;
pub mod webhook;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

use crate::config::NotifyConfig;
use crate::probe::ProbeResult;
use crate::watch::WatchTarget;
use chrono::{DateTime, Utc};

/// A detected restock (or a transport check), ready to be delivered.
#[derive(Debug, Clone)]
pub struct RestockEvent {
    /// One-line summary; doubles as the email subject.
    pub summary: String,
    pub product_url: String,
    pub resolved_url: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub reason: String,
    pub detected_at: DateTime<Utc>,
}

impl RestockEvent {
    /// Build the event for a confirmed out-of-stock → in-stock transition.
    pub fn restock(target: &WatchTarget, result: &ProbeResult, detected_at: DateTime<Utc>) -> Self {
        Self {
            summary: "Restock detected!".to_string(),
            product_url: target.url.clone(),
            resolved_url: result.resolved_url.clone(),
            color: target.color.clone(),
            size: target.size.clone(),
            reason: result.reason.clone(),
            detected_at,
        }
    }

    /// Build a startup transport-check event (`--test-notify`).
    pub fn transport_check(target: &WatchTarget, now: DateTime<Utc>) -> Self {
        Self {
            summary: "Restock watcher transport check".to_string(),
            product_url: target.url.clone(),
            resolved_url: target.url.clone(),
            color: target.color.clone(),
            size: target.size.clone(),
            reason: "if you received this, the transport is configured correctly".to_string(),
            detected_at: now,
        }
    }

    /// Render the full message body delivered through every transport.
    pub fn message(&self) -> String {
        format!(
            "{}\nProduct: {}\nOpen: {}\nColor: {} | Size: {}\nSignal: {}\nTime: {}",
            self.summary,
            self.product_url,
            self.resolved_url,
            self.color.as_deref().unwrap_or("(any)"),
            self.size.as_deref().unwrap_or("(any)"),
            self.reason,
            self.detected_at.format("%Y-%m-%d %H:%M:%SZ"),
        )
    }
}

/// A notification transport.
pub trait Notifier {
    /// Short transport name, used in delivery-failure log lines.
    fn name(&self) -> &'static str;

    /// Deliver the event. Errors are reported by the caller; they never
    /// abort the watch cycle.
    fn notify(&self, event: &RestockEvent) -> anyhow::Result<()>;
}

/// Build the set of enabled transports from configuration.
pub fn build_notifiers(config: &NotifyConfig) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(email) = &config.email {
        notifiers.push(Box::new(EmailNotifier::new(email.clone())));
    }
    if let Some(url) = &config.webhook_url {
        notifiers.push(Box::new(WebhookNotifier::new(url.clone())));
    }
    notifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use std::time::Duration;

    fn target() -> WatchTarget {
        WatchTarget {
            url: "https://shop.example/p/1".to_string(),
            color: Some("cloud white".to_string()),
            size: None,
            poll_interval: Duration::from_secs(180),
        }
    }

    #[test]
    fn test_restock_message_contains_everything() {
        let result = ProbeResult::available(
            "add-to-cart enabled for color cloud white",
            "https://shop.example/p/1?color=cw",
        );
        let event = RestockEvent::restock(&target(), &result, Utc::now());
        let message = event.message();
        assert!(message.starts_with("Restock detected!"));
        assert!(message.contains("https://shop.example/p/1"));
        assert!(message.contains("https://shop.example/p/1?color=cw"));
        assert!(message.contains("cloud white"));
        assert!(message.contains("Size: (any)"));
        assert!(message.contains("add-to-cart enabled"));
    }

    #[test]
    fn test_transport_check_message() {
        let event = RestockEvent::transport_check(&target(), Utc::now());
        assert!(event.summary.contains("transport check"));
        assert!(event.message().contains("configured correctly"));
    }

    #[test]
    fn test_build_notifiers_respects_config() {
        assert!(build_notifiers(&NotifyConfig::default()).is_empty());

        let both = NotifyConfig {
            email: Some(EmailConfig {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: "user".to_string(),
                password: "secret".to_string(),
                from: "from@example.com".to_string(),
                to: "to@example.com".to_string(),
            }),
            webhook_url: Some("https://discord.com/api/webhooks/1/x".to_string()),
        };
        let notifiers = build_notifiers(&both);
        assert_eq!(notifiers.len(), 2);
        assert_eq!(notifiers[0].name(), "email");
        assert_eq!(notifiers[1].name(), "webhook");
    }
}
