//! Per-field averaging and two-dataset comparison.
//!
//! Rows produced by the parser are averaged over a fixed
//! [`TargetFieldSet`](types::TargetFieldSet), stored per slot in a
//! [`ComparisonSession`](compare::ComparisonSession) and merged into one
//! chart-ready series.

pub mod aggregate;
pub mod compare;
pub mod types;
