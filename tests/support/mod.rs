//! A scripted site model implementing the driver traits, so the strategy
//! ladder can be exercised without Chrome.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use contact_autofill::consent::ConsentLocator;
use contact_autofill::driver::{Anchor, Driver, FieldHandle, FormHandle, Launcher, PageFacts};
use contact_autofill::{EngineConfig, Error, FieldDescriptor, Result, Timings};

#[derive(Debug, Clone, Default)]
pub struct FakeField {
    pub descriptor: FieldDescriptor,
    pub broken: bool,
}

impl FakeField {
    pub fn input(r#type: Option<&str>, name: &str) -> Self {
        Self {
            descriptor: FieldDescriptor {
                tag: "input".into(),
                r#type: r#type.map(String::from),
                name: Some(name.into()),
                placeholder: None,
                id: None,
            },
            broken: false,
        }
    }

    pub fn textarea(name: &str) -> Self {
        Self {
            descriptor: FieldDescriptor {
                tag: "textarea".into(),
                name: Some(name.into()),
                ..Default::default()
            },
            broken: false,
        }
    }

    /// Filling this field fails, as a detached or hidden element would.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn key(&self) -> String {
        self.descriptor.name.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeForm {
    pub fields: Vec<FakeField>,
    pub submit: bool,
    /// Selectors that match something inside the form.
    pub matching: Vec<String>,
}

impl FakeForm {
    pub fn new(fields: Vec<FakeField>) -> Self {
        Self {
            fields,
            submit: true,
            matching: Vec::new(),
        }
    }

    pub fn without_submit(mut self) -> Self {
        self.submit = false;
        self
    }

    /// Place an element with the given class inside the form.
    pub fn with_class(mut self, class: &str) -> Self {
        let lower = class.to_lowercase();
        if lower.contains("captcha") {
            self.matching.push(r#"[class*="captcha" i]"#.into());
        }
        if lower.contains("recaptcha") {
            self.matching.push(r#"[class*="recaptcha" i]"#.into());
        }
        if class.split_whitespace().any(|c| c == "g-recaptcha") {
            self.matching.push(".g-recaptcha".into());
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub forms: Vec<FakeForm>,
    pub anchors: Vec<Anchor>,
    pub mailtos: Vec<String>,
    pub iframes: Vec<Option<usize>>,
    pub consent: Option<ConsentLocator>,
    pub facts: PageFacts,
}

impl FakePage {
    pub fn with_form(mut self, form: FakeForm) -> Self {
        self.forms.push(form);
        self
    }

    pub fn with_link(mut self, text: &str, href: &str, resolved: &str) -> Self {
        self.anchors.push(Anchor {
            text: text.into(),
            href: href.into(),
            resolved: resolved.into(),
            visible: true,
        });
        self
    }

    pub fn with_mailto(mut self, href: &str) -> Self {
        self.mailtos.push(href.into());
        self
    }

    pub fn with_iframe(mut self, forms: Option<usize>) -> Self {
        self.iframes.push(forms);
        self
    }

    pub fn with_consent(mut self, locator: ConsentLocator) -> Self {
        self.consent = Some(locator);
        self
    }
}

/// Everything the engine did against the fake browser.
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub launches: usize,
    pub closes: usize,
    pub navigations: Vec<String>,
    pub consent_clicks: Vec<String>,
    pub described: usize,
    pub fills: Vec<(String, String)>,
    pub screenshots: Vec<PathBuf>,
    pub submit_clicks: usize,
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Events>>);

impl Journal {
    pub fn snapshot(&self) -> Events {
        self.0.lock().unwrap().clone()
    }

    fn record(&self, f: impl FnOnce(&mut Events)) {
        f(&mut self.0.lock().unwrap());
    }
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    pub pages: Arc<HashMap<String, FakePage>>,
    pub journal: Journal,
    pub fail_launch: bool,
}

impl FakeLauncher {
    pub fn new(pages: Vec<(&str, FakePage)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            journal: Journal::default(),
            fail_launch: false,
        }
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _config: &EngineConfig) -> Result<FakeSession> {
        if self.fail_launch {
            return Err(Error::LaunchError("no chrome here".into()));
        }
        self.journal.record(|e| e.launches += 1);
        Ok(FakeSession {
            pages: Arc::clone(&self.pages),
            journal: self.journal.clone(),
            current: Mutex::new(None),
        })
    }
}

pub struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    journal: Journal,
    current: Mutex<Option<String>>,
}

impl FakeSession {
    fn page(&self) -> Result<FakePage> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .ok_or_else(|| Error::JsError("no document loaded".into()))
    }
}

#[async_trait]
impl Driver for FakeSession {
    type Form = FakeFormHandle;

    async fn goto(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.journal.record(|e| e.navigations.push(url.to_string()));
        if !self.pages.contains_key(url) {
            return Err(Error::NavigationError(format!("net::ERR_NAME_NOT_RESOLVED at {url}")));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn click_if_visible(&self, locator: &ConsentLocator, _timeout: Duration) -> Result<bool> {
        if self.page()?.consent == Some(*locator) {
            self.journal.record(|e| e.consent_clicks.push(locator.to_string()));
            return Ok(true);
        }
        Ok(false)
    }

    async fn forms(&self) -> Result<Vec<FakeFormHandle>> {
        Ok(self
            .page()?
            .forms
            .into_iter()
            .map(|form| FakeFormHandle {
                form,
                journal: self.journal.clone(),
            })
            .collect())
    }

    async fn anchors(&self) -> Result<Vec<Anchor>> {
        Ok(self.page()?.anchors)
    }

    async fn mailto_links(&self) -> Result<Vec<String>> {
        Ok(self.page()?.mailtos)
    }

    async fn iframe_form_counts(&self, limit: usize) -> Result<Vec<Option<usize>>> {
        Ok(self.page()?.iframes.into_iter().take(limit).collect())
    }

    async fn page_facts(&self) -> Result<PageFacts> {
        Ok(self.page()?.facts)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.journal.record(|e| e.screenshots.push(path.to_path_buf()));
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.journal.record(|e| e.closes += 1);
        Ok(())
    }
}

pub struct FakeFormHandle {
    form: FakeForm,
    journal: Journal,
}

#[async_trait]
impl FormHandle for FakeFormHandle {
    type Field = FakeFieldHandle;

    async fn contains(&self, selector: &str) -> Result<bool> {
        Ok(self.form.matching.iter().any(|s| s == selector))
    }

    async fn fields(&self) -> Result<Vec<FakeFieldHandle>> {
        Ok(self
            .form
            .fields
            .iter()
            .cloned()
            .map(|field| FakeFieldHandle {
                field,
                journal: self.journal.clone(),
            })
            .collect())
    }

    async fn has_submit_control(&self) -> Result<bool> {
        Ok(self.form.submit)
    }

    async fn click_submit(&self) -> Result<()> {
        self.journal.record(|e| e.submit_clicks += 1);
        Ok(())
    }
}

pub struct FakeFieldHandle {
    field: FakeField,
    journal: Journal,
}

#[async_trait]
impl FieldHandle for FakeFieldHandle {
    async fn describe(&self) -> Result<FieldDescriptor> {
        self.journal.record(|e| e.described += 1);
        Ok(self.field.descriptor.clone())
    }

    async fn fill(&self, value: &str) -> Result<()> {
        if self.field.broken {
            return Err(Error::ElementNotFound("element is not attached".into()));
        }
        let key = self.field.key();
        self.journal
            .record(|e| e.fills.push((key, value.to_string())));
        Ok(())
    }
}

/// Engine configuration writing screenshots under `dir`.
pub fn config_in(dir: &Path) -> EngineConfig {
    EngineConfig {
        screenshot_dir: dir.join("screenshots"),
        timings: Timings::default(),
        ..EngineConfig::default()
    }
}
