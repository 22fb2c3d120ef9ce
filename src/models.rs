//! Data models for the risk tracker.
//!
//! This module contains the core data structures used throughout the
//! application: the risk scale and the assessment record.

use crate::errors::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Audit types offered by the assessment form. The set is open: records may
/// carry any other string.
pub const AUDIT_TYPES: [&str; 5] = [
    "Vendor Qualification",
    "Internal Audit",
    "Process Audit",
    "Compliance Audit",
    "System Audit",
];

/// Ordinal risk level used for ISR, RCR and ORA ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RiskLevel {
    /// All levels from highest to lowest, the order used by distribution views.
    pub const DESCENDING: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    /// Returns the wire representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Parses a level name, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for empty or unrecognized input; callers treat both as
    /// an unset rating.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    /// Numeric level on the 1..=3 scale.
    pub fn level(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    /// Numeric level of an optional rating. Unset ratings share the floor
    /// with `Low`.
    pub fn level_of(risk: Option<RiskLevel>) -> u8 {
        risk.map_or(1, |r| r.level())
    }

    /// Returns an emoji representation of the level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }

    /// Chart color for the level.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#ef4444",
        }
    }
}

/// Serde adapter for optional ratings stored as strings, `""` meaning unset.
mod risk_field {
    use super::RiskLevel;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::debug;

    pub fn serialize<S: Serializer>(value: &Option<RiskLevel>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map_or("", |r| r.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RiskLevel>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let parsed = RiskLevel::parse(&raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            debug!("Unknown risk level {:?}, treating as unset", raw);
        }
        Ok(parsed)
    }
}

/// Reads a string field, mapping `null` to empty.
fn null_as_empty<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// A single risk assessment record.
///
/// Every field is optional on read; [`Record::validate`] enforces the
/// required ones before a write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Business identifier, conventionally `PREFIX-NNNNN`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    /// Audit type, usually one of [`AUDIT_TYPES`].
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audit_type: String,
    /// Vendor, process or department under review.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entity: String,
    /// ISO `YYYY-MM-DD` date, empty when absent.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audit_start_date: String,
    /// ISO `YYYY-MM-DD` date, empty when absent.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub risk_assessment_date: String,
    /// Initial Severity Rating.
    #[serde(default, with = "risk_field")]
    pub isr: Option<RiskLevel>,
    /// Risk Control Rating.
    #[serde(default, with = "risk_field")]
    pub rcr: Option<RiskLevel>,
    /// Overall Residual Assessment.
    #[serde(default, with = "risk_field")]
    pub ora: Option<RiskLevel>,
    /// Key drivers and free-form notes.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl Record {
    /// Checks the fields required before a record may enter a collection.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.is_empty() {
            return Err(RecordError::MissingField("id"));
        }
        if self.entity.is_empty() {
            return Err(RecordError::MissingField("entity"));
        }
        Ok(())
    }

    /// Returns the rating as its wire string (`""` when unset).
    pub fn risk_str(risk: Option<RiskLevel>) -> &'static str {
        risk.map_or("", |r| r.as_str())
    }
}
