//! Record filtering.
//!
//! A [`FilterSpec`] is a set of independent predicates combined by logical
//! AND. The free-text search predicate interacts with the others according
//! to the selected [`SearchMode`].

use crate::dates::parse_iso_date;
use crate::models::{Record, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How an active search predicate combines with the other predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// A search match alone decides inclusion; date ranges and exact-match
    /// predicates are ignored while search text is set.
    #[default]
    Supersede,
    /// Search is ANDed with every other predicate.
    Conjunctive,
}

/// Inclusive date bounds over ISO `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Lower bound, empty for unbounded.
    #[serde(default)]
    pub from: String,
    /// Upper bound, empty for unbounded.
    #[serde(default)]
    pub to: String,
}

impl DateRange {
    /// Creates a range from optional bounds.
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.unwrap_or_default().to_string(),
            to: to.unwrap_or_default().to_string(),
        }
    }

    /// Whether either bound is set.
    pub fn is_active(&self) -> bool {
        !self.from.is_empty() || !self.to.is_empty()
    }

    /// Tests a record date against the range.
    ///
    /// Empty or unparseable dates never match an active range, and neither
    /// does anything when a set bound is itself unparseable.
    pub fn contains(&self, date: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = parse_iso_date(date) else {
            return false;
        };

        let after_from =
            self.from.is_empty() || parse_iso_date(&self.from).is_some_and(|from| date >= from);
        let before_to =
            self.to.is_empty() || parse_iso_date(&self.to).is_some_and(|to| date <= to);
        after_from && before_to
    }
}

/// The filter state applied to a record collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Bounds on `audit_start_date`.
    #[serde(default)]
    pub audit_start_date: DateRange,
    /// Bounds on `risk_assessment_date`.
    #[serde(default)]
    pub risk_assessment_date: DateRange,
    /// Exact audit type, empty for any.
    #[serde(default)]
    pub audit_type: String,
    /// Exact ISR, `None` for any.
    #[serde(default)]
    pub isr: Option<RiskLevel>,
    /// Exact RCR, `None` for any.
    #[serde(default)]
    pub rcr: Option<RiskLevel>,
    /// Exact ORA, `None` for any.
    #[serde(default)]
    pub ora: Option<RiskLevel>,
    /// Case-insensitive substring matched against id, entity and notes.
    #[serde(default)]
    pub search_text: String,
}

impl FilterSpec {
    /// Whether every predicate is a wildcard.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resets every predicate to its wildcard.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Tests a single record.
    pub fn matches(&self, record: &Record, mode: SearchMode) -> bool {
        let needle = self.search_text.to_lowercase();
        self.matches_with_needle(record, &needle, mode)
    }

    fn matches_with_needle(&self, record: &Record, needle: &str, mode: SearchMode) -> bool {
        if needle.is_empty() {
            return self.matches_fields(record);
        }

        match mode {
            SearchMode::Supersede => matches_search(record, needle),
            SearchMode::Conjunctive => self.matches_fields(record) && matches_search(record, needle),
        }
    }

    fn matches_fields(&self, record: &Record) -> bool {
        if !self.audit_start_date.contains(&record.audit_start_date) {
            return false;
        }
        if !self.risk_assessment_date.contains(&record.risk_assessment_date) {
            return false;
        }
        if !self.audit_type.is_empty() && record.audit_type != self.audit_type {
            return false;
        }

        exact(self.isr, record.isr) && exact(self.rcr, record.rcr) && exact(self.ora, record.ora)
    }
}

fn exact(wanted: Option<RiskLevel>, actual: Option<RiskLevel>) -> bool {
    wanted.map_or(true, |w| actual == Some(w))
}

fn matches_search(record: &Record, needle: &str) -> bool {
    [&record.id, &record.entity, &record.notes]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filter records, preserving their relative order.
pub fn filter_records(records: &[Record], spec: &FilterSpec, mode: SearchMode) -> Vec<Record> {
    let needle = spec.search_text.to_lowercase();

    let filtered: Vec<Record> = records
        .iter()
        .filter(|r| spec.matches_with_needle(r, &needle, mode))
        .cloned()
        .collect();

    debug!(
        "Filter retained {} of {} records",
        filtered.len(),
        records.len()
    );

    filtered
}
