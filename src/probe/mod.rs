//! Availability probing.
//!
//! A probe is a single check of the current page state for purchasability.
//! The [`StockProber`] owns the decision logic (variant filters, control
//! state, out-of-stock phrase fallback) and talks to the page exclusively
//! through the [`Renderer`] / [`PageSession`] traits, so everything here is
//! testable without launching a browser. The headless Chrome implementation
//! lives in [`chrome`].
//!
//! A probe never fails: every render or navigation error is folded into an
//! `in_stock = false` result whose reason describes the failure. The fixed
//! polling interval is the retry mechanism.

pub mod chrome;
pub(crate) mod renderer;

pub use chrome::ChromeRenderer;
pub use renderer::{ControlProbe, PageSession, Renderer, Selection};

use crate::watch::WatchTarget;

/// Phrases that signal "not purchasable" when no add-to-cart control can be
/// located at all. Matched against whitespace-normalized, lowercased body
/// text.
const OUT_OF_STOCK_PHRASES: &[&str] = &["out of stock", "sold out", "currently unavailable"];

/// Outcome of a single availability probe. Transient; consumed immediately
/// by the watch loop and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether the targeted variant is purchasable right now.
    pub in_stock: bool,
    /// Human-readable explanation, populated on success and failure alike.
    pub reason: String,
    /// URL the page resolved to after redirects; falls back to the
    /// configured URL when navigation never completed.
    pub resolved_url: String,
}

impl ProbeResult {
    pub fn available(reason: impl Into<String>, resolved_url: impl Into<String>) -> Self {
        Self {
            in_stock: true,
            reason: reason.into(),
            resolved_url: resolved_url.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>, resolved_url: impl Into<String>) -> Self {
        Self {
            in_stock: false,
            reason: reason.into(),
            resolved_url: resolved_url.into(),
        }
    }
}

/// A source of availability probes. The watch loop depends only on this.
pub trait Prober {
    /// Probe the target once. Must not panic and must not error: transient
    /// failures are reported as `in_stock = false` with a descriptive reason.
    fn probe(&self, target: &WatchTarget) -> ProbeResult;
}

/// Prober that evaluates purchasability of a rendered product page.
pub struct StockProber<R: Renderer> {
    renderer: R,
}

impl<R: Renderer> StockProber<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Walk the page: apply variant filters, then classify the add-to-cart
    /// control. Errors after navigation (stale elements, evaluation
    /// failures) bubble up to `probe` and become a reason string.
    fn evaluate(&self, session: &dyn PageSession, target: &WatchTarget) -> anyhow::Result<ProbeResult> {
        let resolved = session.resolved_url();

        if let Some(color) = &target.color {
            match session.select_color(color)? {
                Selection::Selected => {}
                Selection::PresentButDisabled => {
                    return Ok(ProbeResult::unavailable(
                        format!("color '{color}' is listed but currently disabled"),
                        resolved,
                    ));
                }
                Selection::NotFound => {
                    return Ok(ProbeResult::unavailable(
                        format!("color '{color}' not offered on this page"),
                        resolved,
                    ));
                }
            }
        }

        if let Some(size) = &target.size {
            match session.select_size(size)? {
                Selection::Selected => {}
                Selection::PresentButDisabled => {
                    return Ok(ProbeResult::unavailable(
                        format!("size '{size}' is listed but currently disabled"),
                        resolved,
                    ));
                }
                Selection::NotFound => {
                    return Ok(ProbeResult::unavailable(
                        format!("size '{size}' not offered on this page"),
                        resolved,
                    ));
                }
            }
        }

        match session.purchase_control()? {
            ControlProbe::Enabled => Ok(ProbeResult::available(
                format!("add-to-cart enabled for {}", describe_variant(target)),
                resolved,
            )),
            ControlProbe::Disabled => Ok(ProbeResult::unavailable(
                "add-to-cart control is disabled",
                resolved,
            )),
            ControlProbe::Missing { page_text } => {
                let reason = match detect_out_of_stock_phrase(&page_text) {
                    Some(phrase) => format!("page says '{phrase}'"),
                    None => "could not find an add-to-cart control".to_string(),
                };
                Ok(ProbeResult::unavailable(reason, resolved))
            }
        }
    }
}

impl<R: Renderer> Prober for StockProber<R> {
    fn probe(&self, target: &WatchTarget) -> ProbeResult {
        let session = match self.renderer.open(&target.url) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!("page render failed: {e:#}");
                return ProbeResult::unavailable(
                    format!("page unavailable: {e:#}"),
                    target.url.clone(),
                );
            }
        };

        match self.evaluate(session.as_ref(), target) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("probe evaluation failed: {e:#}");
                ProbeResult::unavailable(format!("probe failed: {e:#}"), session.resolved_url())
            }
        }
    }
}

/// Describe the variant filter for reason strings, e.g.
/// "color cloud white, size M" or "any variant".
fn describe_variant(target: &WatchTarget) -> String {
    match (&target.color, &target.size) {
        (Some(color), Some(size)) => format!("color {color}, size {size}"),
        (Some(color), None) => format!("color {color}"),
        (None, Some(size)) => format!("size {size}"),
        (None, None) => "any variant".to_string(),
    }
}

/// Scan normalized page text for a known out-of-stock phrase.
fn detect_out_of_stock_phrase(page_text: &str) -> Option<&'static str> {
    let normalized = chrome::normalize(page_text);
    OUT_OF_STOCK_PHRASES
        .iter()
        .find(|phrase| normalized.contains(*phrase))
        .copied()
}
