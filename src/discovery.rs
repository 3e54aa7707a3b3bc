//! Choosing where to look once the homepage has no form.

use crate::driver::Anchor;

const CONTACT_KEYWORDS: &[&str] = &["contact", "get in touch"];

fn mentions_contact(value: &str) -> bool {
    let value = value.to_lowercase();
    CONTACT_KEYWORDS.iter().any(|kw| value.contains(kw))
}

/// First visible anchor pointing at a contact page, as an absolute `http(s)` URL.
pub fn pick_contact_link(anchors: &[Anchor]) -> Option<String> {
    anchors
        .iter()
        .filter(|a| a.visible && (mentions_contact(&a.text) || mentions_contact(&a.href)))
        .map(|a| a.resolved.trim())
        .find(|href| href.starts_with("http"))
        .map(String::from)
}

/// Addresses behind `mailto:` hrefs, without query strings, deduplicated in
/// document order.
pub fn mailto_addresses(hrefs: &[String]) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for href in hrefs {
        let Some(rest) = strip_mailto(href) else {
            continue;
        };
        let address = rest.split('?').next().unwrap_or("").trim();
        if address.is_empty() || emails.iter().any(|e| e.eq_ignore_ascii_case(address)) {
            continue;
        }
        emails.push(address.to_string());
    }
    emails
}

fn strip_mailto(href: &str) -> Option<&str> {
    let href = href.trim();
    href.get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .map(|_| &href[7..])
}
