//! One analysis run, from raw rows to report.
//!
//! Stages run in order, each consuming the complete output of the previous:
//!
//! 1. validation (row errors are collected, not raised)
//! 2. filtering: unassigned lot, resource allow-list, time window
//! 3. baselines, computed on the filtered records
//! 4. deviations
//! 5. aggregation by the configured dimension
//! 6. normal fit of the overweight deviations
//! 7. weight profiles of the filtered records
//!
//! # Examples
//!
//! ```
//! use u_packweight::config::AnalysisConfig;
//! use u_packweight::pipeline::run;
//! use u_packweight::record::RawRow;
//!
//! let rows = vec![
//!     RawRow::new("R1", "L1", "01/01/2024 08:00:00", "100"),
//!     RawRow::new("R1", "L1", "01/01/2024 08:01:00", "110"),
//!     RawRow::new("R1", "L1", "01/01/2024 08:02:00", "120"),
//!     RawRow::new("R1", "L1", "bad", "120"),
//! ];
//! let report = run(&rows, &AnalysisConfig::default()).unwrap();
//! assert_eq!(report.row_errors.len(), 1);
//! assert_eq!(report.baselines["R1"].median_weight, 110.0);
//! assert_eq!(report.summaries[0].total_deviation, 10.0);
//! // One overweight value is not enough for a fit; the rest of the report
//! // is still available.
//! assert!(report.fit.is_err());
//! ```

use std::path::Path;

use crate::aggregate::{aggregate, overweight_values, GroupBy, GroupSummary};
use crate::baseline::{estimate_with, Baselines};
use crate::config::{AnalysisConfig, TimeWindow};
use crate::deviation::{compute, DeviationRecord};
use crate::distribution::{fit, DistributionFit};
use crate::error::{PipelineError, Result, RowError};
use crate::ingest::load_rows;
use crate::profile::{profile, WeightProfile};
use crate::record::{MeasurementRecord, RawRow};
use crate::validate::validate;

/// Everything one run produces.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Dimension the summaries are grouped by.
    pub group_by: GroupBy,
    /// Rows rejected by validation, in input order.
    pub row_errors: Vec<RowError>,
    /// Time range of every valid record, before filtering. Useful as the
    /// default bounds of a window.
    pub span: Option<TimeWindow>,
    /// Records that passed validation and every filter.
    pub records: Vec<MeasurementRecord>,
    pub baselines: Baselines,
    pub deviations: Vec<DeviationRecord>,
    pub summaries: Vec<GroupSummary>,
    /// Normal fit of the overweight deviations. A failure here does not
    /// invalidate the other outputs.
    pub fit: Result<DistributionFit>,
    pub profiles: Vec<WeightProfile>,
}

/// Runs the full analysis on `raw_rows`.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if the input is empty or no row passes
///   validation; nothing downstream runs
/// - [`PipelineError::InvalidConfig`] if `config` fails validation
/// - [`PipelineError::MissingBaseline`] on an internal inconsistency
pub fn run(raw_rows: &[RawRow], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    if raw_rows.is_empty() {
        return Err(PipelineError::InvalidInput(
            "input contains no data rows".to_string(),
        ));
    }

    let validation = validate(raw_rows);
    if validation.records.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "all {} rows failed validation",
            raw_rows.len()
        )));
    }
    if validation.has_errors() {
        tracing::warn!(
            rejected = validation.errors.len(),
            total = raw_rows.len(),
            "some rows were rejected"
        );
    }

    let valid = validation.records.len();
    let span = TimeWindow::spanning(&validation.records);
    if let Some(span) = &span {
        tracing::debug!(start = %span.start(), end = %span.end(), "input time span");
    }
    let records: Vec<MeasurementRecord> = validation
        .records
        .into_iter()
        .filter(|r| config.admits(r))
        .collect();
    tracing::debug!(valid, kept = records.len(), "applied record filters");

    let baselines = estimate_with(&records, config.baseline)?;
    let deviations = compute(&records, &baselines)?;
    let summaries = aggregate(&deviations, config.group_by)?;
    let fit_result = fit(&overweight_values(&deviations));
    if let Err(e) = &fit_result {
        tracing::warn!("distribution fit skipped: {e}");
    }
    let profiles = profile(&records, config.histogram_bins);

    tracing::info!(
        records = records.len(),
        resources = baselines.len(),
        groups = summaries.len(),
        group_by = %config.group_by,
        "analysis complete"
    );

    Ok(AnalysisReport {
        group_by: config.group_by,
        row_errors: validation.errors,
        span,
        records,
        baselines,
        deviations,
        summaries,
        fit: fit_result,
        profiles,
    })
}

/// Loads a CSV file and runs the analysis on it.
pub fn run_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let rows = load_rows(path)?;
    run(&rows, config)
}
