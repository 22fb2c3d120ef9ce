//! RiskTrack - audit risk assessment tracker
//!
//! A CLI tool that filters, sorts and analyzes a snapshot of audit risk
//! assessments and renders the view as Markdown, JSON or CSV.
//!
//! Exit codes:
//!   0 - Success (no records above threshold, or no --fail-on set)
//!   1 - Runtime error (invalid arguments, config, unreadable records, etc.)
//!   2 - Records found at or above the --fail-on ORA level

use anyhow::{Context, Result};
use chrono::Utc;
use risktrack::analysis::analyze;
use risktrack::cli::{Args, OutputFormat};
use risktrack::config::{Config, CONFIG_FILE};
use risktrack::models::{RiskLevel, AUDIT_TYPES};
use risktrack::query::{query, QueryOptions};
use risktrack::report::{self, MarkdownOptions, ReportMetadata, RiskReport, DEFAULT_CSV_FILE};
use risktrack::store;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load config before logging so `[general] verbose` can raise the level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("RiskTrack v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .risktrack.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize search mode, risk ordering, and report layout.");
    Ok(())
}

/// Initialize logging at the resolved verbosity level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, query, analyze and render. Returns exit code (0 or 2).
fn run(args: Args, config: Config) -> Result<i32> {
    let input = args
        .input
        .clone()
        .context("--input is required unless --init-config is given")?;

    let records = store::load_records(&input)?;

    let filter = args.filter_spec();
    let sort = args.sort_spec();
    let options = QueryOptions::from(&config.query);

    if !filter.audit_type.is_empty() && !AUDIT_TYPES.contains(&filter.audit_type.as_str()) {
        warn!(
            "Audit type '{}' is not one of the standard types: {}",
            filter.audit_type,
            AUDIT_TYPES.join(", ")
        );
    }
    debug!("Query options: {:?}", options);

    let view = query(&records, &filter, &sort, &options);
    let analytics = analyze(&view);

    let report = RiskReport {
        metadata: ReportMetadata {
            source: input.display().to_string(),
            generated_at: Utc::now(),
            total_records: records.len(),
            displayed_records: view.len(),
            filter,
            sort,
        },
        records: view,
        analytics,
    };

    let format = config.general.format;
    let output = match format {
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &MarkdownOptions::from(&config.report))
        }
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Csv => report::generate_csv_export(&report.records),
    };

    match output_path(&config, format) {
        Some(path) => {
            report::write_report(&output, &path)?;
            if !args.quiet {
                print_summary(&report, &path);
            }
        }
        None => println!("{}", output),
    }

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = RiskLevel::from(fail_level);
        let above = report
            .records
            .iter()
            .filter(|r| r.ora.is_some_and(|ora| ora >= threshold))
            .count();

        if above > 0 {
            eprintln!(
                "\n⛔ {} record(s) with ORA at or above {}. Failing (exit code 2).",
                above, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Resolve where rendered output goes; `None` means stdout.
fn output_path(config: &Config, format: OutputFormat) -> Option<PathBuf> {
    match (&config.general.output, format) {
        (Some(path), _) => Some(PathBuf::from(path)),
        (None, OutputFormat::Csv) => Some(PathBuf::from(DEFAULT_CSV_FILE)),
        (None, _) => None,
    }
}

/// Print a short console summary after writing a report file.
fn print_summary(report: &RiskReport, path: &Path) {
    let insights = &report.analytics.insights;

    println!("\n📊 Risk Summary:");
    println!(
        "   Records shown: {} of {}",
        report.metadata.displayed_records, report.metadata.total_records
    );
    for slice in &report.analytics.current_distribution {
        println!("   - {}: {}", slice.label, slice.count);
    }
    for line in insights.summary_text().lines() {
        println!("   {}", line);
    }
    println!("\n✅ Report saved to: {}", path.display());
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(config) => Ok(config.unwrap_or_default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
