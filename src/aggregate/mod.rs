//! Overweight aggregation.
//!
//! Groups strictly positive deviations by one dimension and summarizes each
//! group with its total excess weight and a descriptive-statistics block.
//!
//! # Grouping dimensions
//!
//! - [`GroupBy::Resource`] — production-line resource
//! - [`GroupBy::Lot`] — production lot
//! - [`GroupBy::Day`] — calendar day of the (naive) timestamp
//!
//! All three go through the same engine, [`aggregate_with`], which takes the
//! key selector as a function.
//!
//! # Statistics
//!
//! [`DescriptiveStats`] reports count, mean, sample standard deviation, min,
//! linear-interpolated quartiles and max. A single-value sample has an
//! undefined standard deviation, reported as `NaN`.

mod describe;
mod group;

pub use describe::DescriptiveStats;
pub use group::{aggregate, aggregate_with, overweight_values, GroupBy, GroupKey, GroupSummary};
