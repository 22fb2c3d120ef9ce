//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.risktrack.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::query::{QueryOptions, RiskOrdering, SearchMode};
use crate::report::MarkdownOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".risktrack.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Query engine settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path. Reports go to stdout when unset, except CSV
    /// exports which fall back to `risk_assessments.csv`.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Query engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How search text combines with the other filters.
    #[serde(default)]
    pub search_mode: SearchMode,

    /// How ISR/RCR/ORA columns are ordered when sorted.
    #[serde(default)]
    pub risk_ordering: RiskOrdering,
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            search_mode: config.search_mode,
            risk_ordering: config.risk_ordering,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Markdown report title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Include the notes column in the Markdown table.
    #[serde(default = "default_true")]
    pub include_notes: bool,

    /// Include the cumulative trend and ISR/ORA tables.
    #[serde(default = "default_true")]
    pub include_trend: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            include_notes: true,
            include_trend: true,
        }
    }
}

fn default_title() -> String {
    "Risk Assessment Report".to_string()
}

fn default_true() -> bool {
    true
}

impl From<&ReportConfig> for MarkdownOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            include_notes: config.include_notes,
            include_trend: config.include_trend,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only where they were explicitly given.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if args.conjunctive_search {
            self.query.search_mode = SearchMode::Conjunctive;
        }
        if args.ordinal_risk_sort {
            self.query.risk_ordering = RiskOrdering::Ordinal;
        }

        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
