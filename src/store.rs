//! Record snapshot loading.
//!
//! Snapshots are JSON arrays of records using the camelCase field names of
//! the assessment form. Loading never validates required fields; incomplete
//! records are reported and kept.

use crate::collection::RecordSet;
use crate::models::Record;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Parse a JSON array of records.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let records: Vec<Record> =
        serde_json::from_str(json).context("Failed to parse records as a JSON array")?;

    let incomplete = records.iter().filter(|r| r.validate().is_err()).count();
    if incomplete > 0 {
        warn!(
            "{} of {} records are missing an id or entity",
            incomplete,
            records.len()
        );
    }

    Ok(records)
}

/// Load a record snapshot from a JSON file.
pub fn load_records(path: &Path) -> Result<RecordSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;

    let records = parse_records(&content)
        .with_context(|| format!("Invalid records file: {}", path.display()))?;

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(RecordSet::new(records))
}
