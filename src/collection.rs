//! Copy-on-write record collection.
//!
//! Every write builds a new [`RecordSet`]; clones taken earlier keep
//! observing the collection they were created from.

use crate::errors::RecordError;
use crate::models::Record;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// An immutable snapshot of assessment records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    records: Arc<[Record]>,
}

impl RecordSet {
    /// Creates a snapshot without validating its members.
    ///
    /// Reads accept any record shape; validation only applies to writes.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns a new set with `record` appended.
    pub fn with_added(&self, record: Record) -> Result<Self, RecordError> {
        record.validate()?;
        debug!("Adding record {}", record.id);

        let mut next = self.records.to_vec();
        next.push(record);
        Ok(Self::new(next))
    }

    /// Returns a new set with the record at `index` replaced.
    pub fn with_updated(&self, index: usize, record: Record) -> Result<Self, RecordError> {
        record.validate()?;
        self.check_index(index)?;
        debug!("Replacing record at {} with {}", index, record.id);

        let next = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| if i == index { record.clone() } else { r.clone() })
            .collect();
        Ok(Self::new(next))
    }

    /// Returns a new set without the record at `index`.
    pub fn without(&self, index: usize) -> Result<Self, RecordError> {
        self.check_index(index)?;
        debug!("Removing record at {}", index);

        let next = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r.clone())
            .collect();
        Ok(Self::new(next))
    }

    fn check_index(&self, index: usize) -> Result<(), RecordError> {
        if index >= self.records.len() {
            return Err(RecordError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }
}

impl Deref for RecordSet {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
