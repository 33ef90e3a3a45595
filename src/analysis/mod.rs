//! Analysis modules.
//!
//! Grouping, percentage and comparison logic over loaded respondents.

pub mod aggregator;

pub use aggregator::*;
