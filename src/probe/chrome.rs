//! Headless Chrome implementation of the rendering collaborator.
//!
//! Everything in this file is at the mercy of retailer page markup and is
//! the maintenance-prone part of the watcher: selection works by probing a
//! handful of fallback strategies (image alt text, button labels) rather
//! than stable selectors. Keep new strategies here; the decision logic in
//! [`super`] must stay markup-agnostic.

use super::renderer::{ControlProbe, PageSession, Renderer, Selection};
use anyhow::Context;
use headless_chrome::browser::tab::Tab;
use headless_chrome::{Browser, Element, LaunchOptions};
use std::sync::Arc;
use std::time::Duration;

/// Desktop user agent; some retailers serve a degraded page to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Button labels commonly used by cookie consent banners.
const COOKIE_BUTTON_LABELS: &[&str] = &[
    "accept",
    "accept all",
    "allow all",
    "i accept",
    "agree",
    "ok",
    "accept cookies",
    "allow all cookies",
];

/// Add-to-cart control labels; retailers vary between "bag" and "cart".
const ADD_CONTROL_LABELS: &[&str] = &["add to bag", "add to cart"];

/// How long to let a client-side app hydrate after navigation.
const HYDRATION_WAIT: Duration = Duration::from_millis(1500);

/// How long to wait for the page to react after selecting a variant.
const SELECTION_SETTLE: Duration = Duration::from_millis(800);

/// Launches and owns a headless Chrome instance; opens one tab per probe.
pub struct ChromeRenderer {
    browser: Browser,
    nav_timeout: Duration,
}

impl ChromeRenderer {
    /// Launch headless Chrome. Failure here is fatal at startup: the
    /// watcher cannot run without its rendering collaborator.
    pub fn new(nav_timeout: Duration) -> anyhow::Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let browser = Browser::new(options).context("failed to launch headless Chrome")?;
        Ok(Self {
            browser,
            nav_timeout,
        })
    }
}

impl Renderer for ChromeRenderer {
    fn open(&self, url: &str) -> anyhow::Result<Box<dyn PageSession>> {
        let tab = self.browser.new_tab().context("failed to open tab")?;
        tab.set_default_timeout(self.nav_timeout);
        tab.set_user_agent(USER_AGENT, None, None)
            .context("failed to set user agent")?;
        tab.navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .with_context(|| format!("failed to load {url}"))?;

        // Give the client-side app a moment to hydrate before querying DOM.
        std::thread::sleep(HYDRATION_WAIT);
        dismiss_cookie_banner(&tab);

        Ok(Box::new(ChromeSession { tab }))
    }
}

struct ChromeSession {
    tab: Arc<Tab>,
}

impl PageSession for ChromeSession {
    fn resolved_url(&self) -> String {
        self.tab.get_url()
    }

    fn select_color(&self, name: &str) -> anyhow::Result<Selection> {
        let target = normalize(name);

        // Strategy A: color swatches are usually thumbnails with the color
        // name in their alt text.
        let images = self.tab.find_elements("img[alt]").unwrap_or_default();
        for image in &images {
            let Some(attrs) = image.get_attributes()? else {
                continue;
            };
            let alt = attr_value(&attrs, "alt").unwrap_or_default();
            if !normalize(alt).contains(&target) {
                continue;
            }
            if image.click().is_ok() {
                std::thread::sleep(SELECTION_SETTLE);
                return Ok(Selection::Selected);
            }
        }

        // Strategy B: a button labeled with the color name.
        let mut saw_disabled = false;
        let buttons = self.tab.find_elements("button").unwrap_or_default();
        for button in &buttons {
            let text = button.get_inner_text().unwrap_or_default();
            if !normalize(&text).contains(&target) {
                continue;
            }
            if element_is_disabled(button)? {
                saw_disabled = true;
                continue;
            }
            if button.click().is_ok() {
                std::thread::sleep(SELECTION_SETTLE);
                return Ok(Selection::Selected);
            }
        }

        if saw_disabled {
            Ok(Selection::PresentButDisabled)
        } else {
            Ok(Selection::NotFound)
        }
    }

    fn select_size(&self, size: &str) -> anyhow::Result<Selection> {
        let target = normalize(size);
        let mut saw_disabled = false;

        for selector in ["button", "[role='button']"] {
            let candidates = self.tab.find_elements(selector).unwrap_or_default();
            for candidate in &candidates {
                let label = candidate.get_inner_text().unwrap_or_default();
                if normalize(&label) != target {
                    continue;
                }
                if element_is_disabled(candidate)? {
                    saw_disabled = true;
                    continue;
                }
                if candidate.click().is_ok() {
                    std::thread::sleep(SELECTION_SETTLE);
                    return Ok(Selection::Selected);
                }
            }
        }

        if saw_disabled {
            Ok(Selection::PresentButDisabled)
        } else {
            Ok(Selection::NotFound)
        }
    }

    fn purchase_control(&self) -> anyhow::Result<ControlProbe> {
        let buttons = self.tab.find_elements("button").unwrap_or_default();
        for button in &buttons {
            let text = button.get_inner_text().unwrap_or_default();
            if !is_add_control_label(&text) {
                continue;
            }
            return if element_is_disabled(button)? {
                Ok(ControlProbe::Disabled)
            } else {
                Ok(ControlProbe::Enabled)
            };
        }

        // No control at all; hand back body text so the prober can look
        // for explicit out-of-stock wording.
        let page_text = self
            .tab
            .find_element("body")
            .and_then(|body| body.get_inner_text())
            .unwrap_or_default();
        Ok(ControlProbe::Missing { page_text })
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // One tab per probe; leaking tabs would slowly exhaust the browser.
        let _ = self.tab.close(true);
    }
}

/// Best-effort: click a consent button if a cookie banner is present.
/// Failure is irrelevant; the stock controls are usually reachable anyway.
fn dismiss_cookie_banner(tab: &Arc<Tab>) {
    let buttons = tab.find_elements("button").unwrap_or_default();
    for button in &buttons {
        let text = match button.get_inner_text() {
            Ok(text) => normalize(&text),
            Err(_) => continue,
        };
        if COOKIE_BUTTON_LABELS.contains(&text.as_str()) {
            let _ = button.click();
            return;
        }
    }
}

fn element_is_disabled(element: &Element<'_>) -> anyhow::Result<bool> {
    Ok(is_disabled(element.get_attributes()?.as_deref()))
}

/// Lowercase and collapse all whitespace runs to single spaces.
pub(crate) fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Look up an attribute value in the flat `[name, value, ...]` list the
/// DevTools protocol returns.
fn attr_value<'a>(attrs: &'a [String], name: &str) -> Option<&'a str> {
    attrs
        .chunks_exact(2)
        .find(|pair| pair[0] == name)
        .map(|pair| pair[1].as_str())
}

/// A control counts as disabled with either the `disabled` attribute or
/// `aria-disabled="true"`; retailers use both conventions.
fn is_disabled(attrs: Option<&[String]>) -> bool {
    let Some(attrs) = attrs else {
        return false;
    };
    if attr_value(attrs, "disabled").is_some() {
        return true;
    }
    attr_value(attrs, "aria-disabled")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn is_add_control_label(text: &str) -> bool {
    let normalized = normalize(text);
    ADD_CONTROL_LABELS
        .iter()
        .any(|label| normalized.contains(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Cloud\n  WHITE "), "cloud white");
        assert_eq!(normalize("M"), "m");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_attr_value_reads_flat_pairs() {
        let attrs = vec![
            "class".to_string(),
            "swatch".to_string(),
            "alt".to_string(),
            "Cloud White".to_string(),
        ];
        assert_eq!(attr_value(&attrs, "alt"), Some("Cloud White"));
        assert_eq!(attr_value(&attrs, "class"), Some("swatch"));
        assert_eq!(attr_value(&attrs, "disabled"), None);
    }

    #[test]
    fn test_is_disabled_via_attribute() {
        let attrs = vec!["disabled".to_string(), String::new()];
        assert!(is_disabled(Some(&attrs)));
    }

    #[test]
    fn test_is_disabled_via_aria() {
        let attrs = vec!["aria-disabled".to_string(), "TRUE".to_string()];
        assert!(is_disabled(Some(&attrs)));

        let not_disabled = vec!["aria-disabled".to_string(), "false".to_string()];
        assert!(!is_disabled(Some(&not_disabled)));
    }

    #[test]
    fn test_is_disabled_without_attributes() {
        assert!(!is_disabled(None));
        assert!(!is_disabled(Some(&[])));
    }

    #[test]
    fn test_add_control_label_variants() {
        assert!(is_add_control_label("Add to Bag"));
        assert!(is_add_control_label("ADD TO CART"));
        assert!(is_add_control_label("  add \n to   bag  "));
        assert!(!is_add_control_label("Add to Wishlist"));
    }
}
