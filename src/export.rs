//! Report export and re-import.
//!
//! Summaries are written as CSV with a fixed column order:
//!
//! ```text
//! <Key>,count,mean,std,min,25%,50%,75%,max,total_deviation
//! ```
//!
//! where `<Key>` is `Resource`, `LOT` or `Date`. Numbers use the shortest
//! representation that parses back to the same `f64`, so an exported report
//! re-imports without loss.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};
use serde::Serialize;

use crate::aggregate::{DescriptiveStats, GroupBy, GroupSummary};
use crate::baseline::ResourceBaseline;
use crate::config::TimeWindow;
use crate::distribution::DistributionFit;
use crate::error::{PipelineError, Result, RowError};
use crate::pipeline::AnalysisReport;
use crate::profile::WeightProfile;

/// Statistic columns following the key column.
pub const STAT_COLUMNS: [&str; 9] = [
    "count",
    "mean",
    "std",
    "min",
    "25%",
    "50%",
    "75%",
    "max",
    "total_deviation",
];

/// Header row for a report grouped by `group_by`.
pub fn header(group_by: GroupBy) -> Vec<&'static str> {
    let mut cols = Vec::with_capacity(STAT_COLUMNS.len() + 1);
    cols.push(group_by.column());
    cols.extend_from_slice(&STAT_COLUMNS);
    cols
}

fn summary_row(summary: &GroupSummary) -> Vec<String> {
    let s = &summary.stats;
    vec![
        summary.key.to_string(),
        s.count.to_string(),
        s.mean.to_string(),
        s.std.to_string(),
        s.min.to_string(),
        s.p25.to_string(),
        s.p50.to_string(),
        s.p75.to_string(),
        s.max.to_string(),
        summary.total_deviation.to_string(),
    ]
}

/// Serializes summaries to CSV, one row per group in the given order.
///
/// # Examples
///
/// ```
/// use u_packweight::aggregate::{DescriptiveStats, GroupBy, GroupKey, GroupSummary};
/// use u_packweight::export::export;
///
/// let summary = GroupSummary {
///     key: GroupKey::Resource("R1".to_string()),
///     total_deviation: 10.0,
///     stats: DescriptiveStats::from_sample(&[10.0]).unwrap(),
/// };
/// let csv = export(&[summary], GroupBy::Resource).unwrap();
/// assert_eq!(
///     csv,
///     "Resource,count,mean,std,min,25%,50%,75%,max,total_deviation\n\
///      R1,1,10,NaN,10,10,10,10,10,10\n"
/// );
/// ```
pub fn export(summaries: &[GroupSummary], group_by: GroupBy) -> Result<String> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(header(group_by))?;
    for summary in summaries {
        wtr.write_record(summary_row(summary))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| PipelineError::InvalidInput(format!("report is not UTF-8: {e}")))
}

fn parse_field<T: std::str::FromStr>(record: &StringRecord, idx: usize) -> Result<T> {
    let text = record.get(idx).unwrap_or("");
    text.trim().parse::<T>().map_err(|_| {
        PipelineError::InvalidInput(format!(
            "line {}: cannot parse column '{}' value '{text}'",
            record.position().map_or(0, |p| p.line()),
            if idx == 0 { "key" } else { STAT_COLUMNS[idx - 1] }
        ))
    })
}

/// Parses a report produced by [`export`].
///
/// # Errors
///
/// [`PipelineError::InvalidInput`] if the header does not match the export
/// layout or a cell cannot be parsed.
pub fn import(text: &str) -> Result<(GroupBy, Vec<GroupSummary>)> {
    let mut rdr = ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();

    let group_by = headers
        .get(0)
        .and_then(GroupBy::from_column)
        .ok_or_else(|| PipelineError::InvalidInput("unknown report key column".to_string()))?;
    let expected = header(group_by);
    if headers.len() != expected.len() || headers.iter().zip(&expected).any(|(a, b)| a != *b) {
        return Err(PipelineError::InvalidInput(format!(
            "report header must be '{}'",
            expected.join(",")
        )));
    }

    let mut summaries = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let key = group_by.parse_key(record.get(0).unwrap_or(""))?;
        summaries.push(GroupSummary {
            key,
            stats: DescriptiveStats {
                count: parse_field(&record, 1)?,
                mean: parse_field(&record, 2)?,
                std: parse_field(&record, 3)?,
                min: parse_field(&record, 4)?,
                p25: parse_field(&record, 5)?,
                p50: parse_field(&record, 6)?,
                p75: parse_field(&record, 7)?,
                max: parse_field(&record, 8)?,
            },
            total_deviation: parse_field(&record, 9)?,
        });
    }
    Ok((group_by, summaries))
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote report");
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    group_by: GroupBy,
    rejected_rows: &'a [RowError],
    span: Option<&'a TimeWindow>,
    baselines: Vec<&'a ResourceBaseline>,
    summaries: &'a [GroupSummary],
    fit: Option<&'a DistributionFit>,
    fit_error: Option<String>,
    profiles: &'a [WeightProfile],
}

/// Serializes the report as pretty JSON: rejected rows, data span,
/// baselines, summaries, fit and per-resource weight profiles.
///
/// Undefined statistics (`NaN`) become `null`.
pub fn to_json(report: &AnalysisReport) -> Result<String> {
    let (fit, fit_error) = match &report.fit {
        Ok(f) => (Some(f), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let json = JsonReport {
        group_by: report.group_by,
        rejected_rows: &report.row_errors,
        span: report.span.as_ref(),
        baselines: report.baselines.values().collect(),
        summaries: &report.summaries,
        fit,
        fit_error,
        profiles: &report.profiles,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
