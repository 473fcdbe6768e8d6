//! Transport configuration and startup validation.
//!
//! All values are read once at startup (CLI flags and environment
//! variables); nothing here is mutated afterwards. Credentials are never
//! embedded in source or written to logs.

use crate::error::WatchError;

/// SMTP settings for the email transport. All fields are required once
/// email notifications are enabled.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Which notification transports are enabled, and their settings.
#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    /// SMTP transport; `None` when email notifications are disabled.
    pub email: Option<EmailConfig>,
    /// Discord-compatible webhook URL; `None` when disabled.
    pub webhook_url: Option<String>,
}

impl NotifyConfig {
    /// Names of the enabled transports, for the startup summary line.
    pub fn transport_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.email.is_some() {
            names.push("email");
        }
        if self.webhook_url.is_some() {
            names.push("webhook");
        }
        names
    }

    /// Whether at least one transport is enabled.
    pub fn any_enabled(&self) -> bool {
        self.email.is_some() || self.webhook_url.is_some()
    }
}

/// Assemble an [`EmailConfig`] from individually optional parts, failing
/// with a single message that lists every missing variable (the usual
/// failure mode is several unset variables at once, not one).
pub fn email_config_from_parts(
    host: Option<String>,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<EmailConfig, WatchError> {
    let mut missing = Vec::new();
    if host.is_none() {
        missing.push("SMTP_HOST");
    }
    if username.is_none() {
        missing.push("SMTP_USERNAME");
    }
    if password.is_none() {
        missing.push("SMTP_PASSWORD");
    }
    if from.is_none() {
        missing.push("EMAIL_FROM");
    }
    if to.is_none() {
        missing.push("EMAIL_TO");
    }
    if !missing.is_empty() {
        return Err(WatchError::Config(format!(
            "email enabled but missing env vars: {}",
            missing.join(", ")
        )));
    }

    // All checked above
    Ok(EmailConfig {
        host: host.unwrap_or_default(),
        port,
        username: username.unwrap_or_default(),
        password: password.unwrap_or_default(),
        from: from.unwrap_or_default(),
        to: to.unwrap_or_default(),
    })
}

/// Validate the product URL at startup: it must parse as an absolute
/// http(s) URL. Anything else is a fatal configuration error.
pub fn validate_product_url(url: &str) -> Result<(), WatchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| WatchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WatchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme must be http or https, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_complete() {
        let config = email_config_from_parts(
            Some("smtp.example.com".to_string()),
            587,
            Some("user".to_string()),
            Some("secret".to_string()),
            Some("from@example.com".to_string()),
            Some("to@example.com".to_string()),
        )
        .expect("complete config should validate");
        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
    }

    #[test]
    fn test_email_config_lists_all_missing_vars() {
        let err = email_config_from_parts(None, 587, None, Some("secret".to_string()), None, None)
            .expect_err("missing vars should fail");
        let msg = err.to_string();
        assert!(msg.contains("SMTP_HOST"));
        assert!(msg.contains("SMTP_USERNAME"));
        assert!(msg.contains("EMAIL_FROM"));
        assert!(msg.contains("EMAIL_TO"));
        assert!(!msg.contains("SMTP_PASSWORD"), "password was provided: {msg}");
    }

    #[test]
    fn test_validate_product_url_accepts_https() {
        assert!(validate_product_url("https://www.example.com/shop/p/cami-61713322").is_ok());
        assert!(validate_product_url("http://example.com/p/1").is_ok());
    }

    #[test]
    fn test_validate_product_url_rejects_bad_scheme() {
        let err = validate_product_url("ftp://example.com/p/1").expect_err("ftp should fail");
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_validate_product_url_rejects_garbage() {
        assert!(validate_product_url("not a url").is_err());
        assert!(validate_product_url("").is_err());
    }

    #[test]
    fn test_transport_names() {
        let none = NotifyConfig::default();
        assert!(none.transport_names().is_empty());
        assert!(!none.any_enabled());

        let webhook_only = NotifyConfig {
            email: None,
            webhook_url: Some("https://discord.com/api/webhooks/1/x".to_string()),
        };
        assert_eq!(webhook_only.transport_names(), vec!["webhook"]);
        assert!(webhook_only.any_enabled());
    }
}
