//! # u-packweight
//!
//! Pack-weight baselines and overweight aggregation for production-line
//! quality reporting.
//!
//! Measurements are validated, each resource gets a median baseline weight,
//! and the strictly positive deviations from that baseline ("overweight")
//! are summarized per resource, lot or calendar day.
//!
//! ## Modules
//!
//! - [`ingest`] — CSV loading into raw rows
//! - [`validate`] — Row validation with per-row error accumulation
//! - [`config`] — Run configuration (grouping, filters, baseline mode)
//! - [`baseline`] — Per-resource median baseline
//! - [`deviation`] — Signed deviation from the baseline
//! - [`aggregate`] — Overweight groups with descriptive statistics
//! - [`distribution`] — Normal MLE fit and histogram binning
//! - [`profile`] — Per-resource box plot and histogram of weights
//! - [`export`] — CSV/JSON report export and CSV re-import
//! - [`pipeline`] — End-to-end analysis run
//!
//! ## Design Philosophy
//!
//! - **No silent coercion**: bad rows are reported, never patched
//! - **Order-independent**: permuting the input changes no statistic
//! - **Numerical stability**: Leverages `u-numflow` for stable statistics

pub mod aggregate;
pub mod baseline;
pub mod cli;
pub mod config;
pub mod deviation;
pub mod distribution;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod validate;

pub use error::{PipelineError, Result, RowError};
