//! contact-autofill CLI.
//!
//! Prints exactly one JSON document on stdout and exits `0` when the run
//! succeeded, `1` otherwise. Diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::error;

use contact_autofill::{telemetry, FormFillEngine, Result, Target};

#[derive(Parser, Debug)]
#[command(name = "contact-autofill")]
#[command(about = "Find a company's contact form and fill it in")]
#[command(version)]
struct Cli {
    /// Company website
    #[arg(required_unless_present = "targets")]
    url: Option<String>,

    /// Company name; empty to detect it from the homepage
    #[arg(required_unless_present = "targets")]
    company_name: Option<String>,

    /// Message for the contact form
    #[arg(required_unless_present = "targets")]
    message: Option<String>,

    /// Sender email [default: contact@business.com]
    email: Option<String>,

    /// Sender phone; phone fields are left alone when empty
    phone: Option<String>,

    /// Sender name [default: Business Contact]
    contact_person: Option<String>,

    /// Fill and screenshot but never click submit
    #[arg(long, env = "AUTOFILL_DRY_RUN", default_value_t = true, action = ArgAction::Set)]
    dry_run: bool,

    /// Directory for before-submit screenshots
    #[arg(long, env = "AUTOFILL_SCREENSHOT_DIR", default_value = "screenshots")]
    screenshot_dir: PathBuf,

    /// Chrome executable to launch
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// JSON array of targets to process one after another
    #[arg(long, conflicts_with = "url")]
    targets: Option<PathBuf>,

    /// Pause between batch targets, in milliseconds
    #[arg(long, default_value_t = 500)]
    batch_delay_ms: u64,
}

impl Cli {
    fn single_target(&self) -> Option<Target> {
        let target = Target::new(
            self.url.clone()?,
            self.company_name.clone()?,
            self.message.clone()?,
        )
        .email(self.email.clone().unwrap_or_default())
        .phone(self.phone.clone().unwrap_or_default())
        .contact_person(self.contact_person.clone().unwrap_or_default());
        Some(target)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    telemetry::init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(action = "Fatal", "{e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every processed target succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let mut builder = FormFillEngine::builder()
        .dry_run(cli.dry_run)
        .headless(!cli.headful)
        .screenshot_dir(cli.screenshot_dir.clone())
        .batch_delay(Duration::from_millis(cli.batch_delay_ms));
    if let Some(ref path) = cli.chrome_path {
        builder = builder.chrome_path(path.as_str());
    }
    let engine = builder.build();

    if let Some(ref path) = cli.targets {
        let raw = tokio::fs::read_to_string(path).await?;
        let targets: Vec<Target> = serde_json::from_str(&raw)?;
        let reports = engine.run_batch(&targets).await;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(reports.iter().all(|r| r.outcome.success()));
    }

    let Some(target) = cli.single_target() else {
        return Ok(false);
    };
    let outcome = engine.run(&target).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(outcome.success())
}
