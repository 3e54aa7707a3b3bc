//! Company-name detection for targets that arrive without one.
//!
//! Sources are tried from most to least trustworthy: OpenGraph and
//! application-name meta tags, JSON-LD organisation data, the page title,
//! brand elements in the page body, the footer copyright line, and finally
//! the domain name itself.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::driver::{Driver, PageFacts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub name: String,
    pub confidence: Confidence,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CompanyInfo {
    fn new(name: impl Into<String>, confidence: Confidence, method: &str) -> Self {
        Self {
            name: name.into(),
            confidence,
            method: method.to_string(),
            description: None,
            email: None,
            phone: None,
            location: None,
        }
    }
}

/// Read the current page and name the company behind it. Falls back to the
/// domain when the page cannot be read.
pub async fn detect<D: Driver>(driver: &D, url: &str) -> CompanyInfo {
    let info = match driver.page_facts().await {
        Ok(facts) => from_facts(&facts, url),
        Err(e) => {
            debug!(action = "Company Detection", "Page facts unavailable: {e}");
            from_domain(url)
        }
    };
    info!(
        action = "Company Detected",
        "{} ({:?}, {})", info.name, info.confidence, info.method
    );
    info
}

pub fn from_facts(facts: &PageFacts, url: &str) -> CompanyInfo {
    from_meta(facts)
        .or_else(|| facts.ld_json.iter().find_map(|raw| from_ld_json(raw)))
        .or_else(|| from_title(&facts.title))
        .or_else(|| from_page_content(facts))
        .or_else(|| facts.footer_text.as_deref().and_then(from_footer))
        .unwrap_or_else(|| from_domain(url))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn from_meta(facts: &PageFacts) -> Option<CompanyInfo> {
    if let Some(name) = non_empty(&facts.og_site_name) {
        let mut info = CompanyInfo::new(name, Confidence::High, "OpenGraph Meta Tag");
        info.description = non_empty(&facts.og_description).map(String::from);
        return Some(info);
    }
    non_empty(&facts.application_name)
        .map(|name| CompanyInfo::new(name, Confidence::High, "Application Name Meta Tag"))
}

fn type_matches(value: &Value) -> bool {
    let matches = |t: &str| t.contains("Organization") || t.contains("Business") || t == "Corporation";
    match value.get("@type") {
        Some(Value::String(t)) => matches(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn string_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Organisation data from one `application/ld+json` block.
pub fn from_ld_json(raw: &str) -> Option<CompanyInfo> {
    let root: Value = serde_json::from_str(raw).ok()?;
    let mut candidates: Vec<&Value> = Vec::new();
    match &root {
        Value::Array(items) => candidates.extend(items.iter()),
        other => {
            candidates.push(other);
            if let Some(Value::Array(graph)) = other.get("@graph") {
                candidates.extend(graph.iter());
            }
        }
    }

    candidates.into_iter().filter(|v| type_matches(v)).find_map(|org| {
        let name = string_at(org, &["name"]).or_else(|| string_at(org, &["legalName"]))?;
        let mut info = CompanyInfo::new(name, Confidence::High, "Structured Data (JSON-LD)");
        info.description = string_at(org, &["description"]).map(String::from);
        info.email = string_at(org, &["email"]).map(String::from);
        info.phone = string_at(org, &["telephone"]).map(String::from);
        info.location = string_at(org, &["address", "addressLocality"]).map(String::from);
        Some(info)
    })
}

fn title_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+-\s+|\s*[|–—]\s*").expect("valid title separator regex"))
}

fn within_bounds(name: &str) -> bool {
    (3..=100).contains(&name.chars().count())
}

/// The leading segment of a `Name | Tagline` style title.
pub fn from_title(title: &str) -> Option<CompanyInfo> {
    let name = title_separator().split(title.trim()).next()?.trim();
    within_bounds(name).then(|| CompanyInfo::new(name, Confidence::Medium, "Title Tag Analysis"))
}

fn logo_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)logo").expect("valid logo regex"))
}

fn brand_length_ok(name: &str) -> bool {
    (3..=50).contains(&name.chars().count())
}

/// Brand text visible on the page: the navigation brand, then the logo's
/// alt text without the word "logo", then a company element in the header.
pub fn from_page_content(facts: &PageFacts) -> Option<CompanyInfo> {
    if let Some(brand) = non_empty(&facts.nav_brand).filter(|b| brand_length_ok(b)) {
        return Some(CompanyInfo::new(brand, Confidence::Medium, "Navigation Brand"));
    }
    let logo_alt = facts
        .logo_alt
        .as_deref()
        .map(|alt| logo_word().replace(alt, "").trim().to_string())
        .filter(|alt| brand_length_ok(alt));
    if let Some(alt) = logo_alt {
        return Some(CompanyInfo::new(alt, Confidence::Medium, "Logo Alt Text"));
    }
    non_empty(&facts.header_company)
        .map(|name| CompanyInfo::new(name, Confidence::Medium, "Header Content"))
}

fn copyright_patterns() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        let tail = r"\s*(?:\d{4})?\s*(?:-\s*\d{4})?\s*([A-Za-z0-9\s&.,'-]+?)(?:\.|All|Rights|Inc|Ltd|LLC|Corp)";
        [
            Regex::new(&format!("(?i)©{tail}")).expect("valid copyright regex"),
            Regex::new(&format!("(?i)Copyright{tail}")).expect("valid copyright regex"),
        ]
    })
}

/// The holder named in a footer copyright notice.
pub fn from_footer(text: &str) -> Option<CompanyInfo> {
    let name = copyright_patterns()
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())?;
    within_bounds(name).then(|| CompanyInfo::new(name, Confidence::Medium, "Footer Copyright"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `https://www.acme-widgets.co.uk` becomes `Acme Widgets`.
pub fn from_domain(url: &str) -> CompanyInfo {
    let with_scheme = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let host = url::Url::parse(&with_scheme)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));

    let Some(host) = host else {
        return CompanyInfo::new(url, Confidence::Low, "Raw URL (Failed Parsing)");
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let label = host.split('.').next().unwrap_or(host);
    let name = label
        .split(['-', '_'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    CompanyInfo::new(name, Confidence::Low, "Domain Name Parsing (Fallback)")
}
