//! Trait seam between the stock decision logic and the page-rendering
//! collaborator.
//!
//! The watcher consumes exactly three capabilities from a rendered page:
//! resolve the final URL, select a variant (color/size), and classify the
//! purchase control. Keeping them behind traits lets the prober be driven
//! by fakes in tests and keeps every fragile selector in one place
//! ([`super::chrome`]).

/// Outcome of trying to select a variant option on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The option was found and clicked.
    Selected,
    /// The option exists on the page but is marked disabled (typically the
    /// site's own way of flagging that variant as out of stock).
    PresentButDisabled,
    /// No matching option anywhere on the page.
    NotFound,
}

/// Classification of the add-to-cart control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlProbe {
    /// Control present and clickable.
    Enabled,
    /// Control present but disabled (attribute or aria-disabled).
    Disabled,
    /// No control found; carries the page body text so the caller can look
    /// for explicit out-of-stock wording.
    Missing { page_text: String },
}

/// A rendered page, scoped to one probe cycle.
///
/// Methods may error on DOM evaluation failures (detached nodes, script
/// timeouts); the prober maps such errors to an out-of-stock result rather
/// than letting them escape the cycle.
pub trait PageSession {
    /// URL the page resolved to after redirects.
    fn resolved_url(&self) -> String;

    /// Try to select a color option by (case- and whitespace-insensitive)
    /// name match.
    fn select_color(&self, name: &str) -> anyhow::Result<Selection>;

    /// Try to select a size option by exact label match.
    fn select_size(&self, size: &str) -> anyhow::Result<Selection>;

    /// Locate and classify the add-to-cart control.
    fn purchase_control(&self) -> anyhow::Result<ControlProbe>;
}

/// Opens product pages. Construction of the concrete renderer is the only
/// probe-related operation allowed to be fatal (at startup); `open` errors
/// are per-cycle and recoverable.
pub trait Renderer {
    fn open(&self, url: &str) -> anyhow::Result<Box<dyn PageSession>>;
}
