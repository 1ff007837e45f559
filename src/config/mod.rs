#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};

use crate::core::ConfigProvider;
use crate::domain::model::Category;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use toml_config::TomlConfig;

/// Effective settings after layering command-line overrides on top of the TOML file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub page_size: usize,
    pub default_category: Category,
    pub verbose: bool,
    pub json_logs: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<usize>,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Settings {
    pub fn resolve(file: Option<TomlConfig>, overrides: Overrides) -> Result<Self> {
        let mut config = file.unwrap_or_default();

        if let Some(base_url) = overrides.base_url {
            config.service.base_url = base_url;
        }
        if let Some(timeout) = overrides.timeout_seconds {
            config.service.timeout_seconds = timeout;
        }
        if let Some(page_size) = overrides.page_size {
            config.parts.page_size = page_size;
        }

        config.validate()?;

        Ok(Self {
            verbose: overrides.verbose || config.verbose(),
            json_logs: overrides.json_logs || config.json_logs(),
            default_category: config.parts.default_category.parse()?,
            base_url: config.service.base_url,
            timeout_seconds: config.service.timeout_seconds,
            page_size: config.parts.page_size,
        })
    }
}

impl ConfigProvider for Settings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn default_category(&self) -> Category {
        self.default_category
    }
}
