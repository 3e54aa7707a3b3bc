//! The contact-discovery strategy ladder.
//!
//! One run launches a browser session, tries in order the homepage form, a
//! linked contact page (form, then mailto), and the first iframes, and closes
//! the session again whatever happened. Every failure ends up as a
//! [`FillOutcome`]; nothing is returned as an error.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::browser::ChromeLauncher;
use crate::captcha;
use crate::classify::{classify, FieldRole, FillState, SUBJECT_LINE};
use crate::company::{self, CompanyInfo};
use crate::config::{EngineBuilder, EngineConfig};
use crate::consent;
use crate::discovery;
use crate::driver::{Driver, FieldHandle, FormHandle, Launcher};
use crate::error::Result;
use crate::outcome::FillOutcome;
use crate::target::Target;

/// Iframes past this index are never inspected.
pub const IFRAME_SCAN_LIMIT: usize = 2;

/// What one run produced, plus the company name detected along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyInfo>,
    #[serde(rename = "result")]
    pub outcome: FillOutcome,
}

pub struct FormFillEngine<L> {
    launcher: L,
    config: EngineConfig,
}

impl FormFillEngine<ChromeLauncher> {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}

impl<L: Launcher> FormFillEngine<L> {
    pub fn new(launcher: L, config: EngineConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn run(&self, target: &Target) -> FillOutcome {
        self.run_report(target).await.outcome
    }

    /// Run the ladder for one target in a fresh browser session.
    pub async fn run_report(&self, target: &Target) -> RunReport {
        let mut company = None;
        let outcome = match self.launcher.launch(&self.config).await {
            Ok(session) => {
                let outcome = match self.ladder(&session, target, &mut company).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(action = "Processing Error", "{e}");
                        FillOutcome::Error {
                            error: e.to_string(),
                        }
                    }
                };
                if let Err(e) = session.close().await {
                    warn!(action = "Browser Close", "{e}");
                }
                outcome
            }
            Err(e) => {
                error!(action = "Browser Launch", "{e}");
                FillOutcome::Error {
                    error: e.to_string(),
                }
            }
        };

        info!(
            action = "Result",
            success = outcome.success(),
            "{} ({})",
            outcome.method(),
            target.url
        );
        RunReport {
            url: target.url.clone(),
            company,
            outcome,
        }
    }

    /// Run targets one after another, each in its own session, pausing
    /// between them.
    pub async fn run_batch(&self, targets: &[Target]) -> Vec<RunReport> {
        let mut reports = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.timings.batch_delay).await;
            }
            info!(action = "Batch", "{}/{}: {}", i + 1, targets.len(), target.url);
            reports.push(self.run_report(target).await);
        }
        reports
    }

    async fn ladder<D: Driver>(
        &self,
        driver: &D,
        target: &Target,
        detected: &mut Option<CompanyInfo>,
    ) -> Result<FillOutcome> {
        let timings = &self.config.timings;

        info!(action = "Strategy 1", "Checking homepage for forms");
        driver.goto(&target.url, timings.homepage_navigation).await?;
        consent::dismiss(driver, timings).await;
        tokio::time::sleep(timings.homepage_settle).await;

        if target.company_name.trim().is_empty() {
            *detected = Some(company::detect(driver, &target.url).await);
        }

        let forms = driver.forms().await?;
        info!(action = "Homepage Forms", "Found {} forms", forms.len());
        if let Some(form) = forms.first() {
            return Ok(self.fill_and_submit(driver, form, target).await);
        }

        info!(action = "Strategy 2", "Looking for contact page");
        if let Some(link) = find_contact_link(driver).await {
            return self.contact_page(driver, &link, target).await;
        }

        info!(action = "Strategy 3", "Checking iframes");
        if iframe_has_form(driver).await {
            info!(action = "Iframe Form", "Found form in iframe");
            return Ok(FillOutcome::FormInIframe);
        }

        error!(action = "No Contact Found", "No form or contact page found");
        Ok(FillOutcome::NoContactFound)
    }

    async fn contact_page<D: Driver>(
        &self,
        driver: &D,
        link: &str,
        target: &Target,
    ) -> Result<FillOutcome> {
        let timings = &self.config.timings;

        info!(action = "Contact Link Found", "{link}");
        driver.goto(link, timings.contact_navigation).await?;
        consent::dismiss(driver, timings).await;
        tokio::time::sleep(timings.contact_settle).await;

        let forms = driver.forms().await?;
        info!(action = "Contact Page Forms", "Found {} forms", forms.len());
        if let Some(form) = forms.first() {
            return Ok(self.fill_and_submit(driver, form, target).await);
        }

        let emails = discovery::mailto_addresses(&driver.mailto_links().await?);
        if let Some(first) = emails.first() {
            info!(action = "Email Found", success = true, "{first}");
            return Ok(FillOutcome::EmailFound { emails });
        }

        warn!(action = "Contact Page Only", "No form or email found");
        Ok(FillOutcome::ContactPageOnly)
    }

    async fn fill_and_submit<D: Driver>(
        &self,
        driver: &D,
        form: &D::Form,
        target: &Target,
    ) -> FillOutcome {
        info!(action = "Form Filling", "Starting form fill");

        if captcha::detect(form).await {
            return FillOutcome::FormWithCaptcha;
        }

        match self.complete_form(driver, form, target).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(action = "Form Submission", "{e}");
                FillOutcome::SubmissionError {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn complete_form<D: Driver>(
        &self,
        driver: &D,
        form: &D::Form,
        target: &Target,
    ) -> Result<FillOutcome> {
        let state = fill_fields(form, target).await?;
        let fields_filled = state.fields_filled;

        if !state.is_complete() {
            warn!(
                action = "Form Incomplete",
                "Email: {}, Message: {}", state.email_filled, state.message_filled
            );
            return Ok(FillOutcome::IncompleteForm { fields_filled });
        }

        let screenshot_url = self.capture_before_submit(driver).await?;

        if !form.has_submit_control().await? {
            warn!(action = "No Submit Button", "Filled {fields_filled} fields");
            return Ok(FillOutcome::NoSubmitButton { fields_filled });
        }

        if self.config.dry_run {
            info!(
                action = "Form Submitted (SIMULATED)",
                success = true,
                "Filled {fields_filled} fields - dry run, submit not clicked"
            );
        } else {
            form.click_submit().await?;
            info!(
                action = "Form Submitted",
                success = true,
                "Filled {fields_filled} fields"
            );
        }
        tokio::time::sleep(self.config.timings.submit_settle).await;

        Ok(FillOutcome::FormSubmitted {
            fields_filled,
            screenshot_url,
        })
    }

    async fn capture_before_submit<D: Driver>(&self, driver: &D) -> Result<String> {
        let dir = &self.config.screenshot_dir;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!(
            "before-submit-{}.png",
            chrono::Utc::now().timestamp_millis()
        ));
        driver.screenshot(&path).await?;
        debug!(action = "Screenshot", "{}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}

fn value_for(role: FieldRole, target: &Target) -> Option<&str> {
    match role {
        FieldRole::Name => Some(target.contact_person.as_str()),
        FieldRole::Email => Some(target.email.as_str()),
        FieldRole::Phone => Some(target.phone.as_str()),
        FieldRole::Subject => Some(SUBJECT_LINE),
        FieldRole::Message => Some(target.message.as_str()),
        FieldRole::Skip => None,
    }
}

/// Classify and fill every input of `form` in document order. A field that
/// cannot be read or written is logged and skipped.
pub async fn fill_fields<F: FormHandle>(form: &F, target: &Target) -> Result<FillState> {
    let fields = form.fields().await?;
    let has_phone = !target.phone.is_empty();
    let mut state = FillState::default();

    for field in &fields {
        let descriptor = match field.describe().await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(action = "Field Error", "{e}");
                continue;
            }
        };

        let role = classify(&descriptor, &state, has_phone);
        let Some(value) = value_for(role, target) else {
            continue;
        };

        match field.fill(value).await {
            Ok(()) => {
                state = state.record(role);
                info!(action = "Field Filled", "{} field", role.label());
            }
            Err(e) => warn!(action = "Field Error", "{e}"),
        }
    }

    Ok(state)
}

async fn find_contact_link<D: Driver>(driver: &D) -> Option<String> {
    match driver.anchors().await {
        Ok(anchors) => discovery::pick_contact_link(&anchors),
        Err(e) => {
            error!(action = "Contact Link Search", "{e}");
            None
        }
    }
}

async fn iframe_has_form<D: Driver>(driver: &D) -> bool {
    match driver.iframe_form_counts(IFRAME_SCAN_LIMIT).await {
        Ok(counts) => counts
            .into_iter()
            .take(IFRAME_SCAN_LIMIT)
            .flatten()
            .any(|forms| forms > 0),
        Err(e) => {
            debug!(action = "Iframe Scan", "{e}");
            false
        }
    }
}
