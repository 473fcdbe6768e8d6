//! SMTP email transport (STARTTLS).

use super::{Notifier, RestockEvent};
use crate::config::EmailConfig;
use anyhow::Context;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers restock alerts over authenticated SMTP with STARTTLS.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build the RFC 5322 message for an event. Split out so address
    /// parsing and assembly are testable without a live SMTP server.
    fn build_message(&self, event: &RestockEvent) -> anyhow::Result<Message> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .with_context(|| format!("invalid from address '{}'", self.config.from))?;
        let to: Mailbox = self
            .config
            .to
            .parse()
            .with_context(|| format!("invalid to address '{}'", self.config.to))?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(event.summary.clone())
            .body(event.message())
            .context("failed to assemble email")
    }
}

impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    fn notify(&self, event: &RestockEvent) -> anyhow::Result<()> {
        let message = self.build_message(event)?;
        let mailer = SmtpTransport::starttls_relay(&self.config.host)
            .with_context(|| format!("cannot resolve SMTP relay '{}'", self.config.host))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        mailer.send(&message).context("SMTP delivery failed")?;
        Ok(())
    }
}
