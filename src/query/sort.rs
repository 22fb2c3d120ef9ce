//! Record ordering.
//!
//! Comparators are chosen per field type: dates compare chronologically,
//! risk ratings follow the configured [`RiskOrdering`], and everything else
//! compares as case-sensitive strings. Sorting is always stable.

use crate::dates::parse_iso_date;
use crate::models::{Record, RiskLevel};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// A sortable record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Id,
    AuditType,
    Entity,
    AuditStartDate,
    RiskAssessmentDate,
    Isr,
    Rcr,
    Ora,
    Notes,
}

/// Declared value type of a field, used to pick a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Date,
    Risk,
    Text,
}

impl SortKey {
    fn kind(&self) -> FieldKind {
        match self {
            SortKey::AuditStartDate | SortKey::RiskAssessmentDate => FieldKind::Date,
            SortKey::Isr | SortKey::Rcr | SortKey::Ora => FieldKind::Risk,
            SortKey::Id | SortKey::AuditType | SortKey::Entity | SortKey::Notes => FieldKind::Text,
        }
    }

    /// Column header used in reports and exports.
    pub fn column_name(&self) -> &'static str {
        match self {
            SortKey::Id => "Audit ID",
            SortKey::AuditType => "Audit Type",
            SortKey::Entity => "Entity/Vendor/Process",
            SortKey::AuditStartDate => "Audit Start Date",
            SortKey::RiskAssessmentDate => "Risk Assessment Date",
            SortKey::Isr => "ISR",
            SortKey::Rcr => "RCR",
            SortKey::Ora => "ORA",
            SortKey::Notes => "Key Drivers/Notes",
        }
    }

    fn text<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            SortKey::Id => &record.id,
            SortKey::AuditType => &record.audit_type,
            SortKey::Entity => &record.entity,
            SortKey::AuditStartDate => &record.audit_start_date,
            SortKey::RiskAssessmentDate => &record.risk_assessment_date,
            SortKey::Isr => Record::risk_str(record.isr),
            SortKey::Rcr => Record::risk_str(record.rcr),
            SortKey::Ora => Record::risk_str(record.ora),
            SortKey::Notes => &record.notes,
        }
    }

    fn risk(&self, record: &Record) -> Option<RiskLevel> {
        match self {
            SortKey::Isr => record.isr,
            SortKey::Rcr => record.rcr,
            SortKey::Ora => record.ora,
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// How risk columns compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskOrdering {
    /// Compare the stored strings: `"" < "High" < "Low" < "Medium"`.
    #[default]
    Alphabetic,
    /// Compare by rank: unset < Low < Medium < High.
    Ordinal,
}

/// The ordering requested for the record view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort by; `None` keeps the filtered order.
    pub key: Option<SortKey>,
    /// Direction applied to the primary comparison.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a spec sorting by `key`.
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Header-click transition: the same key flips direction, any other key
    /// starts ascending.
    pub fn toggle(&self, key: SortKey) -> Self {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self::by(key, direction)
    }
}

/// Compare two records on a single key, ascending.
pub fn compare_by_key(a: &Record, b: &Record, key: SortKey, risk_ordering: RiskOrdering) -> Ordering {
    match (key.kind(), risk_ordering) {
        (FieldKind::Date, _) => parse_iso_date(key.text(a)).cmp(&parse_iso_date(key.text(b))),
        (FieldKind::Risk, RiskOrdering::Ordinal) => key.risk(a).cmp(&key.risk(b)),
        (FieldKind::Risk, RiskOrdering::Alphabetic) | (FieldKind::Text, _) => {
            key.text(a).cmp(key.text(b))
        }
    }
}

/// Sort records into a new vector. Ties keep their input order in both
/// directions.
pub fn sort_records(records: &[Record], spec: &SortSpec, risk_ordering: RiskOrdering) -> Vec<Record> {
    let mut sorted = records.to_vec();

    let Some(key) = spec.key else {
        return sorted;
    };

    debug!("Sorting {} records by {:?} {:?}", sorted.len(), key, spec.direction);
    sorted.sort_by(|a, b| spec.direction.apply(compare_by_key(a, b, key, risk_ordering)));

    sorted
}
