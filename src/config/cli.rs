use crate::config::toml_config::TomlConfig;
use crate::config::{Overrides, Settings};
use crate::domain::model::{
    BrandPreferences, BuildRequest, Category, PartsSort, SortKey, SortOrder, UseCase,
};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "buildmyrig")]
#[command(about = "Get PC build recommendations and browse the parts catalog")]
pub struct CliConfig {
    /// Base URL of the BuildMyRig API (default http://localhost:8000)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that the service is reachable
    Health,

    /// Ask the service for ranked builds
    Recommend {
        #[arg(long)]
        budget: f64,

        /// gaming, workstation or general
        #[arg(long, default_value = "gaming")]
        use_case: UseCase,

        #[arg(long)]
        cpu_brand: Option<String>,

        #[arg(long)]
        gpu_brand: Option<String>,

        /// Print the returned builds as a JSON array instead of build cards
        #[arg(long)]
        json: bool,
    },

    /// Browse one parts category page by page
    Parts {
        /// cpu, gpu, motherboard, ram, storage, psu or case
        category: Option<Category>,

        #[arg(long, default_value = "performance_score")]
        sort_by: SortKey,

        /// Defaults to desc for performance_score, asc for price and name
        #[arg(long)]
        sort_order: Option<SortOrder>,

        /// Page size
        #[arg(long)]
        limit: Option<usize>,

        /// How many pages to load, following "load more" while full pages keep coming
        #[arg(long, default_value = "1")]
        pages: usize,

        #[arg(long)]
        brand: Option<String>,
    },

    /// Every part in the catalog
    AllParts,

    /// Catalog statistics
    Stats,

    /// API version and endpoint list
    Info,
}

impl CliConfig {
    pub fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let page_size = match &self.command {
            Command::Parts { limit, .. } => *limit,
            _ => None,
        };

        Settings::resolve(
            file,
            Overrides {
                base_url: self.base_url.clone(),
                timeout_seconds: self.timeout_seconds,
                page_size,
                verbose: self.verbose,
                json_logs: self.log_json,
            },
        )
    }
}

impl Command {
    pub fn build_request(&self) -> Option<Result<BuildRequest>> {
        match self {
            Command::Recommend {
                budget,
                use_case,
                cpu_brand,
                gpu_brand,
                ..
            } => Some(BuildRequest::new(
                *budget,
                *use_case,
                BrandPreferences::new(cpu_brand.clone(), gpu_brand.clone()),
            )),
            _ => None,
        }
    }

    pub fn parts_sort(&self) -> PartsSort {
        match self {
            Command::Parts {
                sort_by,
                sort_order,
                ..
            } => PartsSort::new(*sort_by, sort_order.unwrap_or(sort_by.default_order())),
            _ => PartsSort::default(),
        }
    }
}
