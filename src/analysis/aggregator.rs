//! Risk analytics aggregation.
//!
//! This module derives the analytic views shown next to the record table:
//! cumulative trend, per-category distribution, ISR/ORA pairs, the current
//! ORA breakdown and ISR to ORA change classification.

use crate::dates::parse_iso_date;
use crate::models::{Record, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Running ORA totals at one point of the assessment timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeTrendPoint {
    /// Risk assessment date of the record that produced this point.
    pub date: String,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// ORA counts for a single audit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub category: String,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl CategoryDistribution {
    fn new(category: String) -> Self {
        Self {
            category,
            high: 0,
            medium: 0,
            low: 0,
        }
    }

    fn increment(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    /// Number of rated records in this category.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Initial vs current numeric risk level for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedMetric {
    pub entity: String,
    /// Numeric ISR level.
    pub initial: u8,
    /// Numeric ORA level.
    pub current: u8,
}

/// One slice of the current ORA breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub label: String,
    pub count: usize,
    pub color: String,
}

impl DistributionSlice {
    /// Share of `total`, rounded to a whole percent.
    pub fn percent_of(&self, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        (self.count as f64 / total as f64 * 100.0).round() as u32
    }
}

/// Direction of change from ISR to ORA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskChange {
    Increased,
    Decreased,
    Unchanged,
}

impl RiskChange {
    /// All classes in display order.
    pub const ALL: [RiskChange; 3] = [
        RiskChange::Increased,
        RiskChange::Decreased,
        RiskChange::Unchanged,
    ];

    /// Classify a record by comparing numeric ORA against numeric ISR.
    pub fn classify(record: &Record) -> Self {
        let initial = RiskLevel::level_of(record.isr);
        let current = RiskLevel::level_of(record.ora);

        match current.cmp(&initial) {
            std::cmp::Ordering::Greater => RiskChange::Increased,
            std::cmp::Ordering::Less => RiskChange::Decreased,
            std::cmp::Ordering::Equal => RiskChange::Unchanged,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskChange::Increased => "Risk Increased",
            RiskChange::Decreased => "Risk Decreased",
            RiskChange::Unchanged => "Risk Unchanged",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskChange::Increased => "#ef4444",
            RiskChange::Decreased => "#10b981",
            RiskChange::Unchanged => "#6b7280",
        }
    }
}

impl fmt::Display for RiskChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Count of records in one change class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskChangeCount {
    pub label: String,
    pub count: usize,
    pub color: String,
}

/// Scalar highlights derived from the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// Records in the view.
    pub total: usize,
    /// Records with ORA = High.
    pub high_risk_count: usize,
    /// `high_risk_count` as a percentage of `total`; 0 for an empty view.
    pub high_risk_percentage: f64,
    /// Records whose ORA is below their ISR.
    pub decreased_count: usize,
    /// Audit type with the most rated records; first seen wins ties.
    pub most_common_audit_type: Option<String>,
}

impl Insights {
    /// Render the insights as plain text lines.
    pub fn summary_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "High Risk Assessments: {} ({:.1}% of total)",
            self.high_risk_count, self.high_risk_percentage
        ));
        lines.push(format!("Risk Improvements: {}", self.decreased_count));
        lines.push(format!(
            "Most Common Audit Type: {}",
            self.most_common_audit_type.as_deref().unwrap_or("N/A")
        ));

        lines.join("\n")
    }
}

/// Every analytic view over one record snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsBundle {
    pub cumulative_trend: Vec<CumulativeTrendPoint>,
    pub category_distribution: Vec<CategoryDistribution>,
    pub paired_metrics: Vec<PairedMetric>,
    pub current_distribution: Vec<DistributionSlice>,
    pub risk_changes: Vec<RiskChangeCount>,
    pub insights: Insights,
}

/// Compute all analytic views for the records in the current view.
pub fn analyze(records: &[Record]) -> AnalyticsBundle {
    let category_distribution = category_distribution(records);
    let insights = compute_insights(records, &category_distribution);

    debug!(
        "Analyzed {} records across {} categories",
        records.len(),
        category_distribution.len()
    );

    AnalyticsBundle {
        cumulative_trend: cumulative_trend(records),
        category_distribution,
        paired_metrics: paired_metrics(records),
        current_distribution: current_distribution(records),
        risk_changes: risk_change_counts(records),
        insights,
    }
}

/// Running ORA totals ordered by risk assessment date.
///
/// Records are re-sorted chronologically regardless of their input order;
/// unparseable dates come first. Records without ORA still add a point.
pub fn cumulative_trend(records: &[Record]) -> Vec<CumulativeTrendPoint> {
    let mut chronological: Vec<&Record> = records.iter().collect();
    chronological.sort_by_key(|r| parse_iso_date(&r.risk_assessment_date));

    let (mut high, mut medium, mut low) = (0, 0, 0);

    chronological
        .into_iter()
        .map(|record| {
            match record.ora {
                Some(RiskLevel::High) => high += 1,
                Some(RiskLevel::Medium) => medium += 1,
                Some(RiskLevel::Low) => low += 1,
                None => {}
            }
            CumulativeTrendPoint {
                date: record.risk_assessment_date.clone(),
                high,
                medium,
                low,
            }
        })
        .collect()
}

/// ORA counts per audit type, in first-seen order.
///
/// Audit types whose records are all unrated are omitted.
pub fn category_distribution(records: &[Record]) -> Vec<CategoryDistribution> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<CategoryDistribution> = Vec::new();

    for record in records {
        let Some(level) = record.ora else {
            continue;
        };

        let slot = *index.entry(record.audit_type.as_str()).or_insert_with(|| {
            rows.push(CategoryDistribution::new(record.audit_type.clone()));
            rows.len() - 1
        });
        rows[slot].increment(level);
    }

    rows
}

/// Numeric ISR/ORA pairs, one per record.
pub fn paired_metrics(records: &[Record]) -> Vec<PairedMetric> {
    records
        .iter()
        .map(|r| PairedMetric {
            entity: r.entity.clone(),
            initial: RiskLevel::level_of(r.isr),
            current: RiskLevel::level_of(r.ora),
        })
        .collect()
}

/// ORA breakdown, High first, with empty slices dropped.
pub fn current_distribution(records: &[Record]) -> Vec<DistributionSlice> {
    RiskLevel::DESCENDING
        .iter()
        .map(|level| DistributionSlice {
            label: format!("{} Risk", level),
            count: records.iter().filter(|r| r.ora == Some(*level)).count(),
            color: level.color().to_string(),
        })
        .filter(|slice| slice.count > 0)
        .collect()
}

/// Count records per [`RiskChange`] class, dropping empty classes.
pub fn risk_change_counts(records: &[Record]) -> Vec<RiskChangeCount> {
    let mut counts: HashMap<RiskChange, usize> = HashMap::new();

    for record in records {
        *counts.entry(RiskChange::classify(record)).or_default() += 1;
    }

    RiskChange::ALL
        .iter()
        .filter_map(|change| {
            let count = counts.get(change).copied().unwrap_or(0);
            (count > 0).then(|| RiskChangeCount {
                label: change.label().to_string(),
                count,
                color: change.color().to_string(),
            })
        })
        .collect()
}

/// Derive scalar insights from the records and their category rows.
pub fn compute_insights(records: &[Record], categories: &[CategoryDistribution]) -> Insights {
    let total = records.len();
    let high_risk_count = records
        .iter()
        .filter(|r| r.ora == Some(RiskLevel::High))
        .count();
    let high_risk_percentage = if total > 0 {
        high_risk_count as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let decreased_count = records
        .iter()
        .filter(|r| RiskChange::classify(r) == RiskChange::Decreased)
        .count();

    let most_common_audit_type = categories
        .iter()
        .fold(None::<&CategoryDistribution>, |best, row| match best {
            Some(b) if row.total() <= b.total() => Some(b),
            _ => Some(row),
        })
        .map(|row| row.category.clone());

    Insights {
        total,
        high_risk_count,
        high_risk_percentage,
        decreased_count,
        most_common_audit_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(
        audit_type: &str,
        assessed: &str,
        isr: Option<RiskLevel>,
        ora: Option<RiskLevel>,
    ) -> Record {
        Record {
            id: format!("IA-{}", assessed),
            audit_type: audit_type.to_string(),
            entity: format!("{} entity", audit_type),
            risk_assessment_date: assessed.to_string(),
            isr,
            ora,
            ..Default::default()
        }
    }

    fn rated(ora: RiskLevel) -> Record {
        create_test_record("Internal Audit", "2025-01-01", None, Some(ora))
    }

    #[test]
    fn test_current_distribution_scenario() {
        let records = vec![
            rated(RiskLevel::High),
            rated(RiskLevel::Medium),
            rated(RiskLevel::Low),
        ];

        let slices = current_distribution(&records);
        let counts: Vec<(&str, usize)> = slices
            .iter()
            .map(|s| (s.label.as_str(), s.count))
            .collect();
        assert_eq!(
            counts,
            vec![("High Risk", 1), ("Medium Risk", 1), ("Low Risk", 1)]
        );
        assert_eq!(slices[0].color, "#ef4444");
    }

    #[test]
    fn test_current_distribution_omits_empty() {
        let records = vec![rated(RiskLevel::Low), rated(RiskLevel::Low)];

        let slices = current_distribution(&records);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, "Low Risk");
        assert_eq!(slices[0].percent_of(records.len()), 100);
    }

    #[test]
    fn test_classification_scenarios() {
        let increased = create_test_record("X", "", Some(RiskLevel::Low), Some(RiskLevel::High));
        let decreased = create_test_record("X", "", Some(RiskLevel::High), Some(RiskLevel::Low));
        let unchanged =
            create_test_record("X", "", Some(RiskLevel::Medium), Some(RiskLevel::Medium));
        let unset = create_test_record("X", "", None, None);

        assert_eq!(RiskChange::classify(&increased), RiskChange::Increased);
        assert_eq!(RiskChange::classify(&decreased), RiskChange::Decreased);
        assert_eq!(RiskChange::classify(&unchanged), RiskChange::Unchanged);
        assert_eq!(RiskChange::classify(&unset), RiskChange::Unchanged);
    }

    #[test]
    fn test_unset_isr_counts_as_low() {
        let record = create_test_record("X", "", None, Some(RiskLevel::Low));
        assert_eq!(RiskChange::classify(&record), RiskChange::Unchanged);

        let record = create_test_record("X", "", None, Some(RiskLevel::Medium));
        assert_eq!(RiskChange::classify(&record), RiskChange::Increased);
    }

    #[test]
    fn test_risk_change_counts_sum_to_total() {
        let records = vec![
            create_test_record("X", "", Some(RiskLevel::Low), Some(RiskLevel::High)),
            create_test_record("X", "", Some(RiskLevel::High), Some(RiskLevel::Low)),
            create_test_record("X", "", Some(RiskLevel::High), Some(RiskLevel::Medium)),
            create_test_record("X", "", None, None),
        ];

        let changes = risk_change_counts(&records);
        let sum: usize = changes.iter().map(|c| c.count).sum();
        assert_eq!(sum, records.len());

        let labels: Vec<&str> = changes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Risk Increased", "Risk Decreased", "Risk Unchanged"]
        );
        assert_eq!(changes[1].count, 2);
    }

    #[test]
    fn test_risk_change_counts_omit_empty() {
        let records = vec![create_test_record(
            "X",
            "",
            Some(RiskLevel::Medium),
            Some(RiskLevel::Medium),
        )];

        let changes = risk_change_counts(&records);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].label, "Risk Unchanged");
        assert_eq!(changes[0].color, "#6b7280");
    }

    #[test]
    fn test_cumulative_trend_resorts_chronologically() {
        let records = vec![
            create_test_record("A", "2025-08-04", None, Some(RiskLevel::Low)),
            create_test_record("A", "2025-06-25", None, Some(RiskLevel::High)),
            create_test_record("A", "2025-07-21", None, None),
            create_test_record("A", "2025-07-30", None, Some(RiskLevel::High)),
        ];

        let trend = cumulative_trend(&records);
        let dates: Vec<&str> = trend.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2025-06-25", "2025-07-21", "2025-07-30", "2025-08-04"]
        );

        assert_eq!((trend[0].high, trend[0].medium, trend[0].low), (1, 0, 0));
        assert_eq!((trend[1].high, trend[1].medium, trend[1].low), (1, 0, 0));
        assert_eq!((trend[2].high, trend[2].medium, trend[2].low), (2, 0, 0));
        assert_eq!((trend[3].high, trend[3].medium, trend[3].low), (2, 0, 1));
    }

    #[test]
    fn test_cumulative_trend_is_monotonic() {
        let records = vec![
            create_test_record("A", "2025-03-01", None, Some(RiskLevel::Medium)),
            create_test_record("A", "", None, Some(RiskLevel::High)),
            create_test_record("A", "2025-01-01", None, Some(RiskLevel::Low)),
            create_test_record("A", "2025-02-01", None, Some(RiskLevel::Medium)),
            create_test_record("A", "garbage", None, None),
        ];

        let trend = cumulative_trend(&records);
        assert_eq!(trend.len(), records.len());
        assert_eq!(trend[0].date, "");
        for pair in trend.windows(2) {
            assert!(pair[1].high >= pair[0].high);
            assert!(pair[1].medium >= pair[0].medium);
            assert!(pair[1].low >= pair[0].low);
        }
    }

    #[test]
    fn test_category_distribution() {
        let records = vec![
            create_test_record("Vendor Qualification", "", None, Some(RiskLevel::High)),
            create_test_record("Internal Audit", "", None, Some(RiskLevel::Medium)),
            create_test_record("Vendor Qualification", "", None, Some(RiskLevel::Low)),
            create_test_record("Internal Audit", "", None, None),
            create_test_record("System Audit", "", None, None),
        ];

        let rows = category_distribution(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Vendor Qualification");
        assert_eq!((rows[0].high, rows[0].medium, rows[0].low), (1, 0, 1));
        assert_eq!(rows[1].category, "Internal Audit");
        assert_eq!(rows[1].total(), 1);

        let rated_total: usize = rows.iter().map(|r| r.total()).sum();
        let rated = records.iter().filter(|r| r.ora.is_some()).count();
        assert_eq!(rated_total, rated);
    }

    #[test]
    fn test_paired_metrics_keep_duplicates() {
        let mut first = create_test_record("X", "", Some(RiskLevel::High), None);
        first.entity = "PharmaLex".to_string();
        let second = Record {
            isr: Some(RiskLevel::Medium),
            ora: Some(RiskLevel::High),
            ..first.clone()
        };

        let pairs = paired_metrics(&[first, second]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].entity, "PharmaLex");
        assert_eq!((pairs[0].initial, pairs[0].current), (3, 1));
        assert_eq!((pairs[1].initial, pairs[1].current), (2, 3));
    }

    #[test]
    fn test_insights() {
        let records = vec![
            create_test_record("Internal Audit", "", Some(RiskLevel::High), Some(RiskLevel::High)),
            create_test_record("Process Audit", "", Some(RiskLevel::High), Some(RiskLevel::Low)),
            create_test_record("Process Audit", "", Some(RiskLevel::Medium), Some(RiskLevel::Low)),
            create_test_record("Internal Audit", "", Some(RiskLevel::Low), Some(RiskLevel::Medium)),
        ];

        let bundle = analyze(&records);
        let insights = &bundle.insights;
        assert_eq!(insights.total, 4);
        assert_eq!(insights.high_risk_count, 1);
        assert!((insights.high_risk_percentage - 25.0).abs() < f64::EPSILON);
        assert_eq!(insights.decreased_count, 2);
        assert_eq!(
            insights.most_common_audit_type.as_deref(),
            Some("Internal Audit")
        );

        let text = insights.summary_text();
        assert!(text.contains("25.0% of total"));
        assert!(text.contains("Risk Improvements: 2"));
    }

    #[test]
    fn test_most_common_audit_type_prefers_larger() {
        let records = vec![
            create_test_record("Internal Audit", "", None, Some(RiskLevel::High)),
            create_test_record("Process Audit", "", None, Some(RiskLevel::Low)),
            create_test_record("Process Audit", "", None, Some(RiskLevel::Low)),
        ];

        let insights = analyze(&records).insights;
        assert_eq!(
            insights.most_common_audit_type.as_deref(),
            Some("Process Audit")
        );
    }

    #[test]
    fn test_analyze_empty() {
        let bundle = analyze(&[]);

        assert!(bundle.cumulative_trend.is_empty());
        assert!(bundle.category_distribution.is_empty());
        assert!(bundle.paired_metrics.is_empty());
        assert!(bundle.current_distribution.is_empty());
        assert!(bundle.risk_changes.is_empty());
        assert_eq!(bundle.insights.high_risk_percentage, 0.0);
        assert_eq!(bundle.insights.most_common_audit_type, None);
        assert_eq!(bundle.insights.summary_text().lines().count(), 3);
    }
}
