//! Report generation.
//!
//! This module renders the record view and its analytics as Markdown,
//! JSON, or the CSV export format.

use crate::analysis::{AnalyticsBundle, CategoryDistribution, Insights};
use crate::dates::display_date;
use crate::models::{Record, RiskLevel};
use crate::query::{FilterSpec, SortSpec};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header row of the CSV export.
pub const CSV_HEADERS: [&str; 9] = [
    "Audit ID",
    "Audit Type",
    "Entity/Vendor/Process",
    "Audit Start Date",
    "Risk Assessment Date",
    "ISR",
    "RCR",
    "ORA",
    "Key Drivers/Notes",
];

/// Default file name for CSV exports.
pub const DEFAULT_CSV_FILE: &str = "risk_assessments.csv";

/// Metadata about the rendered report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the records were loaded from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Records in the loaded snapshot.
    pub total_records: usize,
    /// Records surviving the filter.
    pub displayed_records: usize,
    /// Filter applied to the snapshot.
    pub filter: FilterSpec,
    /// Ordering applied to the view.
    pub sort: SortSpec,
}

/// The complete risk report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub metadata: ReportMetadata,
    /// Records in display order.
    pub records: Vec<Record>,
    pub analytics: AnalyticsBundle,
}

/// Markdown rendering switches.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub title: String,
    pub include_notes: bool,
    pub include_trend: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            title: "Risk Assessment Report".to_string(),
            include_notes: true,
            include_trend: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RiskReport, options: &MarkdownOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", options.title));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_insights_section(&report.analytics.insights));
    output.push_str(&generate_records_section(&report.records, options.include_notes));
    output.push_str(&generate_distribution_section(&report.analytics));
    output.push_str(&generate_category_section(&report.analytics.category_distribution));

    if options.include_trend {
        output.push_str(&generate_trend_section(&report.analytics));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Shown:** {} of {}\n",
        metadata.displayed_records, metadata.total_records
    ));
    if !metadata.filter.is_empty() {
        section.push_str("- **Filters:** active\n");
    }
    if let Some(key) = metadata.sort.key {
        section.push_str(&format!(
            "- **Sorted By:** {} ({:?})\n",
            key.column_name(),
            metadata.sort.direction
        ));
    }
    section.push('\n');

    section
}

/// Generate the key insights section.
fn generate_insights_section(insights: &Insights) -> String {
    let mut section = String::new();

    section.push_str("## Key Insights\n\n");
    for line in insights.summary_text().lines() {
        section.push_str(&format!("- {}\n", line));
    }
    section.push('\n');

    section
}

/// Generate the assessment table.
fn generate_records_section(records: &[Record], include_notes: bool) -> String {
    let mut section = String::new();

    section.push_str("## Assessments\n\n");

    if records.is_empty() {
        section.push_str("No assessments match the current filters.\n\n");
        return section;
    }

    let columns = if include_notes {
        &CSV_HEADERS[..]
    } else {
        &CSV_HEADERS[..CSV_HEADERS.len() - 1]
    };
    section.push_str(&format!("| {} |\n", columns.join(" | ")));
    section.push_str(&format!("|{}\n", ":---|".repeat(columns.len())));

    for record in records {
        let mut cells = vec![
            escape_cell(&record.id),
            escape_cell(&record.audit_type),
            escape_cell(&record.entity),
            display_date(&record.audit_start_date),
            display_date(&record.risk_assessment_date),
            risk_badge(record.isr),
            risk_badge(record.rcr),
            risk_badge(record.ora),
        ];
        if include_notes {
            cells.push(escape_cell(&record.notes));
        }
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

fn risk_badge(risk: Option<RiskLevel>) -> String {
    match risk {
        Some(level) => format!("{} {}", level.emoji(), level),
        None => String::new(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate the ORA distribution and risk change tables.
fn generate_distribution_section(analytics: &AnalyticsBundle) -> String {
    let mut section = String::new();
    let total = analytics.insights.total;

    section.push_str("## Current Risk Distribution (ORA)\n\n");
    if analytics.current_distribution.is_empty() {
        section.push_str("No rated assessments.\n\n");
    } else {
        section.push_str("| Level | Count | Share |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for slice in &analytics.current_distribution {
            section.push_str(&format!(
                "| {} | {} | {}% |\n",
                slice.label,
                slice.count,
                slice.percent_of(total)
            ));
        }
        section.push('\n');
    }

    section.push_str("## Risk Changes (ISR → ORA)\n\n");
    if analytics.risk_changes.is_empty() {
        section.push_str("No assessments to compare.\n\n");
    } else {
        section.push_str("| Change | Count |\n");
        section.push_str("|:---|:---:|\n");
        for change in &analytics.risk_changes {
            section.push_str(&format!("| {} | {} |\n", change.label, change.count));
        }
        section.push('\n');
    }

    section
}

/// Generate the per-audit-type table.
fn generate_category_section(rows: &[CategoryDistribution]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Risk by Audit Type\n\n");
    section.push_str("| Audit Type | High | Medium | Low | **Total** |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | **{}** |\n",
            escape_cell(&row.category),
            row.high,
            row.medium,
            row.low,
            row.total()
        ));
    }
    section.push('\n');

    section
}

/// Generate the cumulative trend and ISR/ORA comparison tables.
fn generate_trend_section(analytics: &AnalyticsBundle) -> String {
    if analytics.cumulative_trend.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Cumulative Risk Trend\n\n");
    section.push_str("| Date | High | Medium | Low |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for point in &analytics.cumulative_trend {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            display_date(&point.date),
            point.high,
            point.medium,
            point.low
        ));
    }
    section.push('\n');

    section.push_str("## ISR vs ORA\n\n");
    section.push_str("| Entity | ISR | ORA |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for pair in &analytics.paired_metrics {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&pair.entity),
            pair.initial,
            pair.current
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by RiskTrack*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RiskReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the CSV export of records in display order.
///
/// The notes column is always quoted. Other fields are quoted only when they
/// contain a comma, a quote or a line break. Embedded quotes are doubled.
pub fn generate_csv_export(records: &[Record]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for r in records {
        lines.push(
            [
                csv_field(&r.id),
                csv_field(&r.audit_type),
                csv_field(&r.entity),
                csv_field(&r.audit_start_date),
                csv_field(&r.risk_assessment_date),
                Record::risk_str(r.isr).to_string(),
                Record::risk_str(r.rcr).to_string(),
                Record::risk_str(r.ora).to_string(),
                csv_quoted(&r.notes),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        csv_quoted(value)
    } else {
        value.to_string()
    }
}

fn csv_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::query::{SortDirection, SortKey};

    fn sample_records() -> Vec<Record> {
        vec![
            Record {
                id: "IA-00910".to_string(),
                audit_type: "Vendor Qualification".to_string(),
                entity: "PharmaLex".to_string(),
                audit_start_date: "2025-03-24".to_string(),
                risk_assessment_date: "2025-06-25".to_string(),
                isr: Some(RiskLevel::High),
                rcr: Some(RiskLevel::Low),
                ora: Some(RiskLevel::High),
                notes: "CSV validation, QMS governance gaps".to_string(),
            },
            Record {
                id: "IA-00880".to_string(),
                audit_type: "Process Audit".to_string(),
                entity: "Phlexeview".to_string(),
                audit_start_date: "2025-07-21".to_string(),
                risk_assessment_date: "2025-08-04".to_string(),
                isr: Some(RiskLevel::Low),
                rcr: Some(RiskLevel::Medium),
                ora: Some(RiskLevel::Low),
                notes: "Said \"done\"".to_string(),
            },
        ]
    }

    fn create_test_report(records: Vec<Record>) -> RiskReport {
        let analytics = analyze(&records);
        RiskReport {
            metadata: ReportMetadata {
                source: "records.json".to_string(),
                generated_at: Utc::now(),
                total_records: 3,
                displayed_records: records.len(),
                filter: FilterSpec::default(),
                sort: SortSpec::by(SortKey::Entity, SortDirection::Asc),
            },
            records,
            analytics,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(sample_records());
        let markdown = generate_markdown_report(&report, &MarkdownOptions::default());

        assert!(markdown.contains("# Risk Assessment Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("**Records Shown:** 2 of 3"));
        assert!(markdown.contains("**Sorted By:** Entity/Vendor/Process (Asc)"));
        assert!(markdown.contains("## Key Insights"));
        assert!(markdown.contains("PharmaLex"));
        assert!(markdown.contains("Mar 24, 2025"));
        assert!(markdown.contains("| High Risk | 1 | 50% |"));
        assert!(markdown.contains("## Risk by Audit Type"));
        assert!(markdown.contains("## Cumulative Risk Trend"));
        assert!(markdown.contains("Key Drivers/Notes"));
    }

    #[test]
    fn test_markdown_options() {
        let report = create_test_report(sample_records());
        let options = MarkdownOptions {
            title: "Q3 Review".to_string(),
            include_notes: false,
            include_trend: false,
        };
        let markdown = generate_markdown_report(&report, &options);

        assert!(markdown.starts_with("# Q3 Review"));
        assert!(!markdown.contains("Key Drivers/Notes"));
        assert!(!markdown.contains("## Cumulative Risk Trend"));
    }

    #[test]
    fn test_markdown_empty_view() {
        let report = create_test_report(Vec::new());
        let markdown = generate_markdown_report(&report, &MarkdownOptions::default());

        assert!(markdown.contains("No assessments match the current filters."));
        assert!(markdown.contains("No rated assessments."));
        assert!(markdown.contains("Most Common Audit Type: N/A"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(sample_records());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"auditType\""));
        assert!(json.contains("\"cumulative_trend\""));
        assert!(json.contains("\"risk_changes\""));
    }

    #[test]
    fn test_generate_csv_export() {
        let csv = generate_csv_export(&sample_records());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Audit ID,Audit Type,Entity/Vendor/Process,Audit Start Date,Risk Assessment Date,ISR,RCR,ORA,Key Drivers/Notes"
        );
        assert_eq!(
            lines[1],
            "IA-00910,Vendor Qualification,PharmaLex,2025-03-24,2025-06-25,High,Low,High,\"CSV validation, QMS governance gaps\""
        );
        assert!(lines[2].ends_with(",\"Said \"\"done\"\"\""));
    }

    #[test]
    fn test_csv_export_empty_and_unset() {
        assert_eq!(generate_csv_export(&[]), CSV_HEADERS.join(","));

        let record = Record {
            id: "IA-1".to_string(),
            entity: "Ops".to_string(),
            ..Default::default()
        };
        let csv = generate_csv_export(&[record]);
        assert!(csv.ends_with("IA-1,,Ops,,,,,,\"\""));
    }

    #[test]
    fn test_csv_export_quotes_delimiters_in_any_field() {
        let record = Record {
            id: "IA-7".to_string(),
            audit_type: "Vendor Qualification".to_string(),
            entity: "Acme, Inc.".to_string(),
            notes: "plain".to_string(),
            ..Default::default()
        };
        let csv = generate_csv_export(&[record]);
        let row = csv.lines().nth(1).unwrap();

        assert_eq!(row, "IA-7,Vendor Qualification,\"Acme, Inc.\",,,,,,\"plain\"");
        assert_eq!(csv_field("Say \"hi\""), "\"Say \"\"hi\"\"\"");
        assert_eq!(csv_field("PharmaLex"), "PharmaLex");
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CSV_FILE);

        write_report("a,b", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b");
    }
}
