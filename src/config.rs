use std::path::PathBuf;
use std::time::Duration;

use crate::browser::ChromeLauncher;
use crate::engine::FormFillEngine;

/// Desktop Chrome on Windows.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bounds on every wait the engine performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Navigation to the target URL.
    pub homepage_navigation: Duration,
    /// Navigation to a discovered contact page.
    pub contact_navigation: Duration,
    /// Pause after the homepage loads, for client-side rendering.
    pub homepage_settle: Duration,
    /// Pause after the contact page loads; form widgets there mount late.
    pub contact_settle: Duration,
    /// How long each consent candidate may take to become visible.
    pub visibility_check: Duration,
    /// Pause after clicking a consent button.
    pub consent_settle: Duration,
    /// Pause after the submit step.
    pub submit_settle: Duration,
    /// Pause between consecutive targets of a batch.
    pub batch_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            homepage_navigation: Duration::from_secs(30),
            contact_navigation: Duration::from_secs(15),
            homepage_settle: Duration::from_secs(2),
            contact_settle: Duration::from_secs(3),
            visibility_check: Duration::from_millis(500),
            consent_settle: Duration::from_millis(200),
            submit_settle: Duration::from_secs(1),
            batch_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fill and screenshot, but never click the submit control.
    pub dry_run: bool,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub chrome_path: Option<String>,
    /// Where `before-submit-<ms>.png` files are written.
    pub screenshot_dir: PathBuf,
    pub timings: Timings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
            screenshot_dir: PathBuf::from("screenshots"),
            timings: Timings::default(),
        }
    }
}

pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Whether to skip the final submit click. Defaults to `true`.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.screenshot_dir = dir.into();
        self
    }

    pub fn timings(mut self, timings: Timings) -> Self {
        self.config.timings = timings;
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.config.timings.batch_delay = delay;
        self
    }

    pub fn build_config(self) -> EngineConfig {
        self.config
    }

    /// Engine backed by a locally installed Chrome.
    pub fn build(self) -> FormFillEngine<ChromeLauncher> {
        FormFillEngine::new(ChromeLauncher, self.build_config())
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
