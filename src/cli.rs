//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and translation into query specs.

use crate::dates::parse_iso_date;
use crate::models::RiskLevel;
use crate::query::{DateRange, FilterSpec, SortDirection, SortKey, SortSpec};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// RiskTrack - audit risk assessment tracker
///
/// Filter, sort and analyze a snapshot of risk assessment records and
/// render the view as a Markdown report, JSON, or a CSV export.
///
/// Examples:
///   risktrack --input records.json
///   risktrack --input records.json --ora high --sort-by risk-assessment-date --desc
///   risktrack --input records.json --search pharma --format csv
///   risktrack --input records.json --fail-on high
///   risktrack --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file holding an array of assessment records
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Markdown and JSON go to stdout when not set.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .risktrack.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Case-insensitive text matched against ID, entity and notes
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Earliest audit start date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub start_from: Option<String>,

    /// Latest audit start date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub start_to: Option<String>,

    /// Earliest risk assessment date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub assessed_from: Option<String>,

    /// Latest risk assessment date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub assessed_to: Option<String>,

    /// Only records of this audit type
    #[arg(long, value_name = "TYPE")]
    pub audit_type: Option<String>,

    /// Only records with this Initial Severity Rating
    #[arg(long, value_name = "LEVEL")]
    pub isr: Option<LevelArg>,

    /// Only records with this Risk Control Rating
    #[arg(long, value_name = "LEVEL")]
    pub rcr: Option<LevelArg>,

    /// Only records with this Overall Residual Assessment
    #[arg(long, value_name = "LEVEL")]
    pub ora: Option<LevelArg>,

    /// Field to sort the view by
    #[arg(long, value_name = "KEY")]
    pub sort_by: Option<SortKey>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort_by")]
    pub desc: bool,

    /// Combine --search with the other filters instead of letting it
    /// replace them
    #[arg(long)]
    pub conjunctive_search: bool,

    /// Sort ISR/RCR/ORA by rank instead of alphabetically
    #[arg(long)]
    pub ordinal_risk_sort: bool,

    /// Markdown report title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Fail if any displayed record has ORA at or above this level
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is exceeded.
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<LevelArg>,

    /// Generate a default .risktrack.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV export
    Csv,
}

/// Risk level accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<LevelArg> for RiskLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Low => RiskLevel::Low,
            LevelArg::Medium => RiskLevel::Medium,
            LevelArg::High => RiskLevel::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let bounds = [
            ("--start-from", &self.start_from),
            ("--start-to", &self.start_to),
            ("--assessed-from", &self.assessed_from),
            ("--assessed-to", &self.assessed_to),
        ];
        for (flag, value) in bounds {
            if let Some(date) = value {
                if parse_iso_date(date).is_none() {
                    return Err(format!("{} must be a YYYY-MM-DD date, got '{}'", flag, date));
                }
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over both `--verbose` and a configured `verbose = true`.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build the filter spec from the filter flags.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            audit_start_date: DateRange::new(self.start_from.as_deref(), self.start_to.as_deref()),
            risk_assessment_date: DateRange::new(
                self.assessed_from.as_deref(),
                self.assessed_to.as_deref(),
            ),
            audit_type: self.audit_type.clone().unwrap_or_default(),
            isr: self.isr.map(RiskLevel::from),
            rcr: self.rcr.map(RiskLevel::from),
            ora: self.ora.map(RiskLevel::from),
            search_text: self.search.clone().unwrap_or_default(),
        }
    }

    /// Build the sort spec from `--sort-by` and `--desc`.
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            key: self.sort_by,
            direction: if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }
    }
}
