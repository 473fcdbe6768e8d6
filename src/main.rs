//! restock-watch: edge-triggered restock watcher for retail product pages.

use anyhow::Context;
use clap::Parser;
use restock_watch::{
    build_notifiers,
    config::{email_config_from_parts, validate_product_url, NotifyConfig},
    parse_duration,
    probe::{ChromeRenderer, StockProber},
    run_watch_loop, Notifier, RestockEvent, StateStore, SystemClock, WatchConfig, WatchTarget,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "restock-watch")]
#[command(version)]
#[command(about = "Watch a product page and alert once when a variant comes back in stock")]
#[command(after_help = "ENVIRONMENT:
    SMTP_HOST, SMTP_PORT, SMTP_USERNAME, SMTP_PASSWORD, EMAIL_FROM, EMAIL_TO
        SMTP settings, required when --email is set (SMTP_PORT defaults to 587)
    DISCORD_WEBHOOK_URL
        Webhook transport, enabled whenever it is set

EXAMPLES:
    # Status lines only, any variant
    restock-watch https://www.hollisterco.com/shop/us/p/cami-61713322

    # Watch one variant, alert via webhook, check every 2 minutes
    DISCORD_WEBHOOK_URL=https://discord.com/api/webhooks/... \\
        restock-watch https://shop.example/p/1 --color 'cloud white' --size M -i 2m

    # Verify transports are configured, then exit
    restock-watch https://shop.example/p/1 --email --test-notify --once")]
struct Cli {
    /// Product page URL to watch
    url: String,

    /// Color name to require (substring match against swatches); any color if omitted
    #[arg(long)]
    color: Option<String>,

    /// Size label to require (exact match); any size if omitted
    #[arg(long)]
    size: Option<String>,

    /// Polling interval (e.g. 30s, 3m, 1h)
    #[arg(long, short = 'i', default_value = "3m")]
    interval: String,

    /// Page navigation timeout (e.g. 45s)
    #[arg(long, default_value = "45s")]
    timeout: String,

    /// Path of the persisted-state file used for de-duplication
    #[arg(long, default_value = ".restock_state.json")]
    state_file: PathBuf,

    /// Enable the email transport (reads SMTP_* / EMAIL_* env vars)
    #[arg(long)]
    email: bool,

    /// Webhook URL for alerts (Discord-compatible)
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    webhook: Option<String>,

    /// Send a test notification through every enabled transport at startup
    #[arg(long)]
    test_notify: bool,

    /// Run a single check cycle and exit
    #[arg(long)]
    once: bool,

    /// Exit with code 0 right after the first restock alert
    #[arg(long)]
    exit_on_restock: bool,

    /// Suppress startup summary and per-cycle status lines
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    validate_product_url(&cli.url)?;
    let poll_interval = parse_duration(&cli.interval)?;
    let nav_timeout = parse_duration(&cli.timeout)?;

    let notify_config = build_notify_config(&cli)?;
    if !notify_config.any_enabled() {
        tracing::warn!("no notification transport enabled; restocks will only appear as status lines");
    }
    let notifiers = build_notifiers(&notify_config);

    let target = WatchTarget {
        url: cli.url,
        color: cli.color,
        size: cli.size,
        poll_interval,
    };

    if cli.test_notify {
        // A transport that cannot deliver now will not deliver the real
        // alert either, so any failure here is fatal.
        run_transport_check(&target, &notifiers)?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let renderer =
        ChromeRenderer::new(nav_timeout).context("cannot start the headless browser")?;
    let prober = StockProber::new(renderer);
    let store = StateStore::new(cli.state_file);

    let config = WatchConfig {
        target,
        state_file: store.path().to_path_buf(),
        once: cli.once,
        exit_on_restock: cli.exit_on_restock,
        quiet: cli.quiet,
    };

    run_watch_loop(&config, &prober, &notifiers, &store, &SystemClock, &stop)
}

/// Assemble transport configuration from flags and environment variables.
fn build_notify_config(cli: &Cli) -> anyhow::Result<NotifyConfig> {
    let email = if cli.email {
        let port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("SMTP_PORT '{raw}' is not a valid port number"))?,
            Err(_) => 587,
        };
        Some(email_config_from_parts(
            std::env::var("SMTP_HOST").ok(),
            port,
            std::env::var("SMTP_USERNAME").ok(),
            std::env::var("SMTP_PASSWORD").ok(),
            std::env::var("EMAIL_FROM").ok(),
            std::env::var("EMAIL_TO").ok(),
        )?)
    } else {
        None
    };

    Ok(NotifyConfig {
        email,
        webhook_url: cli.webhook.clone(),
    })
}

/// Deliver a transport-check event through every enabled transport.
fn run_transport_check(target: &WatchTarget, notifiers: &[Box<dyn Notifier>]) -> anyhow::Result<()> {
    if notifiers.is_empty() {
        anyhow::bail!("--test-notify requires at least one enabled transport");
    }
    let event = RestockEvent::transport_check(target, chrono::Utc::now());
    for notifier in notifiers {
        notifier
            .notify(&event)
            .with_context(|| format!("test notification via {} failed", notifier.name()))?;
        tracing::info!("test notification delivered via {}", notifier.name());
    }
    Ok(())
}
