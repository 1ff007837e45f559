pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{ConsoleNotifier, HttpAdvisorClient, MemoryNotifier};
pub use config::Settings;
pub use core::advisor::{BuildAdvisor, PageOutcome, SubmitOutcome};
pub use utils::error::{AdvisorError, Result};
