use tracing::{debug, warn};

use crate::driver::FormHandle;

/// Markers of a CAPTCHA widget inside a form.
pub const CAPTCHA_SELECTORS: &[&str] = &[
    r#"[class*="captcha" i]"#,
    r#"[class*="recaptcha" i]"#,
    r#"iframe[src*="recaptcha"]"#,
    r#"iframe[src*="captcha"]"#,
    ".g-recaptcha",
    "#recaptcha",
];

/// Whether the form carries a CAPTCHA. A failed query counts as absent.
pub async fn detect<F: FormHandle>(form: &F) -> bool {
    for selector in CAPTCHA_SELECTORS {
        match form.contains(selector).await {
            Ok(true) => {
                warn!(action = "CAPTCHA", "CAPTCHA detected in form ({selector})");
                return true;
            }
            Ok(false) => {}
            Err(e) => debug!(action = "CAPTCHA", "{selector}: {e}"),
        }
    }
    false
}
