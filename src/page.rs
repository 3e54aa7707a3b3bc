use std::path::Path;
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::dom::{GetDocumentParams, Node};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;
use serde::de::DeserializeOwned;

use crate::consent::ConsentLocator;
use crate::driver::{Anchor, PageFacts};
use crate::element::Element;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Attribute used to hand a JS-selected consent button over to a CDP click.
const CONSENT_MARK: &str = "data-autofill-consent";

/// Wrapper around a chromiumoxide Page exposing what the form-fill engine needs.
pub struct Page {
    inner: CrPage,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self { inner }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to `url` and wait for DOMContentLoaded only, so slow
    /// third-party scripts do not hold up the run.
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        let navigate = async {
            let response = self
                .inner
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| Error::NavigationError(e.to_string()))?;
            if let Some(error_text) = response.result.error_text.as_deref() {
                return Err(Error::NavigationError(format!("{url}: {error_text}")));
            }
            self.wait_for_dom_ready().await
        };

        tokio::time::timeout(timeout, navigate)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "navigation to {url} ({}ms)",
                    timeout.as_millis()
                ))
            })?
    }

    async fn wait_for_dom_ready(&self) -> Result<()> {
        loop {
            let state: String = self
                .inner
                .evaluate("document.readyState")
                .await
                .map_err(|e| Error::JsError(e.to_string()))?
                .into_value()
                .map_err(|e| Error::JsError(e.to_string()))?;
            if state != "loading" {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Click the first element matching `locator` once it is visible, polling
    /// for up to `timeout`.
    pub async fn click_if_visible(&self, locator: &ConsentLocator, timeout: Duration) -> Result<bool> {
        let js = mark_visible_js(locator)?;
        let start = Instant::now();

        loop {
            let marked: bool = self
                .inner
                .evaluate(js.as_str())
                .await
                .map_err(|e| Error::JsError(e.to_string()))?
                .into_value()
                .map_err(|e| Error::JsError(e.to_string()))?;
            if marked {
                let el = self.find_element(&format!("[{CONSENT_MARK}]")).await?;
                el.click().await?;
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // ── Observations ────────────────────────────────────────────────

    /// Take a viewport screenshot and save it to a file.
    pub async fn screenshot_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))?;
        Ok(())
    }

    /// Every `<a>` on the page with its text, raw and resolved href, and
    /// whether it takes part in layout.
    pub async fn anchors(&self) -> Result<Vec<Anchor>> {
        let js = r#"
            JSON.stringify(
                Array.from(document.querySelectorAll('a')).map(a => ({
                    text: (a.textContent || '').trim(),
                    href: a.getAttribute('href') || '',
                    resolved: a.href || '',
                    visible: a.offsetParent !== null
                }))
            )
        "#;
        self.evaluate_json(js).await
    }

    pub async fn mailto_links(&self) -> Result<Vec<String>> {
        let js = r#"
            JSON.stringify(
                Array.from(document.querySelectorAll('a[href^="mailto:" i]'))
                    .map(a => a.getAttribute('href') || '')
            )
        "#;
        self.evaluate_json(js).await
    }

    /// Form counts for the first `limit` iframes of the document, read from
    /// the pierced DOM tree so cross-origin frames are included. `None`
    /// where a frame's document is not available.
    pub async fn iframe_form_counts(&self, limit: usize) -> Result<Vec<Option<usize>>> {
        let params = GetDocumentParams::builder().depth(-1).pierce(true).build();
        let returns = self
            .inner
            .execute(params)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(iframe_form_counts_in(&returns.result.root, limit))
    }

    /// Meta tags, JSON-LD, title, brand elements and footer text of the
    /// current document.
    pub async fn page_facts(&self) -> Result<PageFacts> {
        let js = r#"
            JSON.stringify((() => {
                const meta = sel => {
                    const el = document.querySelector(sel);
                    return el ? el.getAttribute('content') : null;
                };
                const text = sel => {
                    const el = document.querySelector(sel);
                    return el ? (el.textContent || '').trim() : null;
                };
                const logo = document.querySelector('img[alt*="logo" i], img[class*="logo" i]');
                const footer = document.querySelector('footer');
                return {
                    title: document.title || '',
                    ogSiteName: meta('meta[property="og:site_name"]'),
                    ogDescription: meta('meta[property="og:description"]'),
                    applicationName: meta('meta[name="application-name"]'),
                    ldJson: Array.from(document.querySelectorAll('script[type="application/ld+json"]'))
                        .map(s => s.textContent || ''),
                    navBrand: text('.navbar-brand, .brand, [class*="logo-text"]'),
                    logoAlt: logo ? logo.getAttribute('alt') : null,
                    headerCompany: text('header [class*="company"], header [class*="brand"]'),
                    footerText: footer ? (footer.textContent || '') : null
                };
            })())
        "#;
        self.evaluate_json(js).await
    }

    /// Evaluate an expression that returns `JSON.stringify(...)` and decode it.
    async fn evaluate_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let json_str: String = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(serde_json::from_str(&json_str)?)
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(Element::new(el))
    }

    /// Find all elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}

fn is_element(node: &Node, name: &str) -> bool {
    node.node_type == 1 && node.node_name.eq_ignore_ascii_case(name)
}

/// Element children and shadow roots, without crossing into frame documents.
fn light_children(node: &Node) -> impl Iterator<Item = &Node> {
    node.children
        .iter()
        .flatten()
        .chain(node.shadow_roots.iter().flatten())
}

fn collect_iframes<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if is_element(node, "iframe") {
        out.push(node);
    }
    for child in light_children(node) {
        collect_iframes(child, out);
    }
}

fn count_forms(node: &Node) -> usize {
    usize::from(is_element(node, "form")) + light_children(node).map(count_forms).sum::<usize>()
}

/// Form counts for the first `limit` iframes under `root`, in document order.
fn iframe_form_counts_in(root: &Node, limit: usize) -> Vec<Option<usize>> {
    let mut frames = Vec::new();
    collect_iframes(root, &mut frames);
    frames
        .into_iter()
        .take(limit)
        .map(|frame| frame.content_document.as_deref().map(count_forms))
        .collect()
}

/// Script that tags the first candidate for `locator` with [`CONSENT_MARK`]
/// when it is visible, and reports whether it did.
fn mark_visible_js(locator: &ConsentLocator) -> Result<String> {
    let find = match locator {
        ConsentLocator::ButtonText(text) => {
            let text_js = serde_json::to_string(&text.to_lowercase())?;
            format!(
                "Array.from(document.querySelectorAll('button')).find(b => \
                 (b.innerText || b.textContent || '').toLowerCase().includes({text_js}))"
            )
        }
        ConsentLocator::Css(selector) => {
            let selector_js = serde_json::to_string(selector)?;
            format!("document.querySelector({selector_js})")
        }
    };
    Ok(format!(
        r#"
        (() => {{
            document.querySelectorAll('[{CONSENT_MARK}]')
                .forEach(el => el.removeAttribute('{CONSENT_MARK}'));
            const el = {find};
            if (!el) return false;
            const style = window.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            if (style.display === 'none' || style.visibility === 'hidden'
                || rect.width === 0 || rect.height === 0) return false;
            el.setAttribute('{CONSENT_MARK}', '1');
            return true;
        }})()
        "#
    ))
}
