//! Analysis modules.
//!
//! Aggregates a filtered record view into chart-ready analytic views.

pub mod aggregator;

pub use aggregator::*;
