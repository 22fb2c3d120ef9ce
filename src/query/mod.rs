//! Query engine: filtering followed by sorting.

pub mod filter;
pub mod sort;

pub use filter::*;
pub use sort::*;

use crate::models::Record;

/// Behavior switches for [`query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    pub search_mode: SearchMode,
    pub risk_ordering: RiskOrdering,
}

/// Filter then sort a record snapshot into the displayed view.
pub fn query(
    records: &[Record],
    filter: &FilterSpec,
    sort: &SortSpec,
    options: &QueryOptions,
) -> Vec<Record> {
    let filtered = filter_records(records, filter, options.search_mode);
    sort_records(&filtered, sort, options.risk_ordering)
}
