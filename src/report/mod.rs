//! Report rendering for the record view and its analytics.

pub mod generator;

pub use generator::*;
