//! Webhook transport: HTTP POST of a JSON payload, Discord-compatible.

use super::{Notifier, RestockEvent};
use anyhow::Context;
use std::time::Duration;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(20);

/// Posts `{"content": <message>}` to a webhook URL.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { url, client }
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn notify(&self, event: &RestockEvent) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&payload(event))
            .send()
            .context("webhook request failed")?;
        response
            .error_for_status()
            .context("webhook returned an error status")?;
        Ok(())
    }
}

/// Discord (and most chat webhooks) expect the message under `content`.
fn payload(event: &RestockEvent) -> serde_json::Value {
    serde_json::json!({ "content": event.message() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeResult;
    use crate::watch::WatchTarget;
    use chrono::Utc;

    #[test]
    fn test_payload_shape() {
        let target = WatchTarget {
            url: "https://shop.example/p/1".to_string(),
            color: Some("cloud white".to_string()),
            size: Some("M".to_string()),
            poll_interval: std::time::Duration::from_secs(180),
        };
        let result = ProbeResult::available("add-to-cart enabled", "https://shop.example/p/1");
        let event = RestockEvent::restock(&target, &result, Utc::now());

        let value = payload(&event);
        let content = value["content"].as_str().expect("content is a string");
        assert!(content.contains("Restock detected!"));
        assert!(content.contains("cloud white"));
    }
}
