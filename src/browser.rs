use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::debug;

use crate::config::EngineConfig;
use crate::consent::ConsentLocator;
use crate::driver::{Anchor, Driver, Launcher, PageFacts};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::page::Page;

/// `no_sandbox()` adds `--no-sandbox`; containers also need the setuid one.
const SANDBOX_ARGS: &[&str] = &["disable-setuid-sandbox"];

/// Chrome flags that cut startup cost without changing page behaviour.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "disable-dev-shm-usage",
    "mute-audio",
    "no-first-run",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-prompt-on-repost",
];

/// Launches a local Chrome for every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl Launcher for ChromeLauncher {
    type Session = BrowserSession;

    async fn launch(&self, config: &EngineConfig) -> Result<BrowserSession> {
        BrowserSession::launch(config).await
    }
}

/// One Chrome process with a single page, alive for exactly one run.
pub struct BrowserSession {
    browser: CrBrowser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(config: &EngineConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in SANDBOX_ARGS.iter().chain(PERF_ARGS) {
            builder = builder.arg(*arg);
        }

        // keep cross-origin iframes in the page's renderer so DOM.getDocument
        // returns their documents
        builder = builder
            .arg("disable-site-isolation-trials")
            .arg(("disable-features", "IsolateOrigins,site-per-process"));

        // chromiumoxide adds the `--` prefix itself
        builder = builder.arg(("user-agent", config.user_agent.as_str()));

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (mut browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let cr_page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(Error::LaunchError(format!("Failed to open page: {e}")));
            }
        };

        Ok(Self {
            browser,
            page: Page::new(cr_page),
            handler_task,
        })
    }

    /// Close the browser, reap the process and stop the event handler.
    pub async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!(action = "Browser Close", "Failed to reap Chrome: {e}");
        }
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}

#[async_trait]
impl Driver for BrowserSession {
    type Form = Element;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        self.page.goto(url, timeout).await
    }

    async fn click_if_visible(&self, locator: &ConsentLocator, timeout: Duration) -> Result<bool> {
        self.page.click_if_visible(locator, timeout).await
    }

    async fn forms(&self) -> Result<Vec<Element>> {
        self.page.find_elements("form").await
    }

    async fn anchors(&self) -> Result<Vec<Anchor>> {
        self.page.anchors().await
    }

    async fn mailto_links(&self) -> Result<Vec<String>> {
        self.page.mailto_links().await
    }

    async fn iframe_form_counts(&self, limit: usize) -> Result<Vec<Option<usize>>> {
        self.page.iframe_form_counts(limit).await
    }

    async fn page_facts(&self) -> Result<PageFacts> {
        self.page.page_facts().await
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page.screenshot_to_file(path).await
    }

    async fn close(self) -> Result<()> {
        self.shutdown().await
    }
}
