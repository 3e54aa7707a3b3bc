pub mod browser;
pub mod captcha;
pub mod classify;
pub mod company;
pub mod config;
pub mod consent;
pub mod discovery;
pub mod driver;
pub mod element;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod page;
pub mod target;
pub mod telemetry;

pub use browser::{BrowserSession, ChromeLauncher};
pub use classify::{classify, FieldDescriptor, FieldRole, FillState};
pub use company::CompanyInfo;
pub use config::{EngineBuilder, EngineConfig, Timings};
pub use engine::{FormFillEngine, RunReport};
pub use error::{Error, Result};
pub use outcome::{FillOutcome, Method};
pub use target::Target;
