//! RiskTrack - audit risk assessment tracker.
//!
//! The core is a stateless query and analytics engine over a snapshot of
//! risk assessment records:
//!
//! - `query` filters and sorts records into the displayed view
//! - [`analysis`] derives trend, distribution and change analytics from a view
//! - [`collection`] holds snapshots and applies validated copy-on-write edits
//!
//! The remaining modules make up the command-line host.

pub mod analysis;
pub mod cli;
pub mod collection;
pub mod config;
pub mod dates;
pub mod errors;
pub mod models;
pub mod query;
pub mod report;
pub mod store;

pub use analysis::{analyze, AnalyticsBundle};
pub use collection::RecordSet;
pub use errors::RecordError;
pub use models::{Record, RiskLevel};
pub use query::{query, FilterSpec, QueryOptions, SortSpec};
