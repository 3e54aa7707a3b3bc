//! The browser operations the form-fill engine relies on.
//!
//! The Chrome backend in [`crate::browser`] implements these over
//! chromiumoxide; tests implement them over a scripted page model.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::classify::FieldDescriptor;
use crate::config::EngineConfig;
use crate::consent::ConsentLocator;
use crate::error::Result;

/// An `<a>` element as seen on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Anchor {
    /// Trimmed `textContent`.
    pub text: String,
    /// The raw `href` attribute.
    pub href: String,
    /// `href` resolved against the document URL.
    pub resolved: String,
    /// Rendered in layout (`offsetParent !== null`).
    pub visible: bool,
}

/// Facts about a homepage used to guess the company name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFacts {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub og_site_name: Option<String>,
    #[serde(default)]
    pub og_description: Option<String>,
    #[serde(default)]
    pub application_name: Option<String>,
    /// Raw text of every `script[type="application/ld+json"]`.
    #[serde(default)]
    pub ld_json: Vec<String>,
    /// Text of `.navbar-brand`, `.brand` or a `logo-text` element.
    #[serde(default)]
    pub nav_brand: Option<String>,
    /// `alt` of the first logo image.
    #[serde(default)]
    pub logo_alt: Option<String>,
    /// Text of a company or brand element inside `<header>`.
    #[serde(default)]
    pub header_company: Option<String>,
    #[serde(default)]
    pub footer_text: Option<String>,
}

/// Starts one browser session per run.
#[async_trait]
pub trait Launcher: Send + Sync {
    type Session: Driver;

    async fn launch(&self, config: &EngineConfig) -> Result<Self::Session>;
}

/// A single page inside a live browser session.
#[async_trait]
pub trait Driver: Send + Sync {
    type Form: FormHandle;

    /// Navigate and wait for DOMContentLoaded, bounded by `timeout`.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Click the first element matching `locator` if it becomes visible within
    /// `timeout`. Returns whether a click happened.
    async fn click_if_visible(&self, locator: &ConsentLocator, timeout: Duration) -> Result<bool>;

    /// All `<form>` elements in document order.
    async fn forms(&self) -> Result<Vec<Self::Form>>;

    async fn anchors(&self) -> Result<Vec<Anchor>>;

    /// `href` values of every `a[href^="mailto:"]`.
    async fn mailto_links(&self) -> Result<Vec<String>>;

    /// Number of forms inside each of the first `limit` iframes, `None` where
    /// the frame document is not reachable.
    async fn iframe_form_counts(&self, limit: usize) -> Result<Vec<Option<usize>>>;

    async fn page_facts(&self) -> Result<PageFacts>;

    /// Capture the visible viewport as PNG.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Tear down the page and the browser behind it.
    async fn close(self) -> Result<()>;
}

#[async_trait]
pub trait FormHandle: Send + Sync {
    type Field: FieldHandle;

    /// Whether any descendant matches the CSS selector.
    async fn contains(&self, selector: &str) -> Result<bool>;

    /// `input` and `textarea` descendants in document order.
    async fn fields(&self) -> Result<Vec<Self::Field>>;

    async fn has_submit_control(&self) -> Result<bool>;

    async fn click_submit(&self) -> Result<()>;
}

#[async_trait]
pub trait FieldHandle: Send + Sync {
    async fn describe(&self) -> Result<FieldDescriptor>;

    /// Replace the current value with `value`.
    async fn fill(&self, value: &str) -> Result<()>;
}
