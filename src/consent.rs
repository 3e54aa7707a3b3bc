//! Cookie/consent banner dismissal.

use tracing::{debug, info};

use crate::config::Timings;
use crate::driver::Driver;

/// How to find a consent "accept" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentLocator {
    /// A `<button>` whose text contains this string (case-insensitive).
    ButtonText(&'static str),
    /// A CSS selector.
    Css(&'static str),
}

impl std::fmt::Display for ConsentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsentLocator::ButtonText(text) => write!(f, "button:has-text(\"{text}\")"),
            ConsentLocator::Css(selector) => f.write_str(selector),
        }
    }
}

/// Candidates tried in order; the first visible one is clicked.
pub const CONSENT_LOCATORS: &[ConsentLocator] = &[
    ConsentLocator::ButtonText("Accept"),
    ConsentLocator::ButtonText("Accept All"),
    ConsentLocator::ButtonText("I Accept"),
    ConsentLocator::Css("#accept-cookies"),
    ConsentLocator::Css(".cookie-accept"),
];

/// Best-effort dismissal of a consent modal. Never fails; a page without a
/// banner is the normal case.
pub async fn dismiss<D: Driver>(driver: &D, timings: &Timings) -> bool {
    for locator in CONSENT_LOCATORS {
        match driver.click_if_visible(locator, timings.visibility_check).await {
            Ok(true) => {
                info!(action = "Cookie Modal", "Dismissed via {locator}");
                tokio::time::sleep(timings.consent_settle).await;
                return true;
            }
            Ok(false) => {}
            Err(e) => debug!(action = "Cookie Modal", "{locator}: {e}"),
        }
    }
    false
}
