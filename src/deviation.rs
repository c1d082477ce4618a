//! Signed deviation of each record from its resource baseline.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::baseline::Baselines;
use crate::error::{PipelineError, Result};
use crate::record::MeasurementRecord;

/// A measurement joined with its resource baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationRecord {
    pub resource_id: String,
    pub lot_id: String,
    pub timestamp: NaiveDateTime,
    pub pack_weight: f64,
    pub median_weight: f64,
    /// `pack_weight - median_weight`, unclamped and unrounded.
    pub deviation: f64,
}

impl DeviationRecord {
    /// Calendar day of the measurement, in the timestamp's own (naive) time.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Strictly positive deviation. A pack exactly at its baseline is not
    /// overweight.
    pub fn is_overweight(&self) -> bool {
        self.deviation > 0.0
    }
}

/// Joins every record to its baseline.
///
/// Output order equals input order.
///
/// # Errors
///
/// [`PipelineError::MissingBaseline`] if a record's resource has no baseline.
/// This means the baselines were not computed from `records`.
///
/// # Examples
///
/// ```
/// use u_packweight::baseline::estimate;
/// use u_packweight::deviation::compute;
/// use u_packweight::record::RawRow;
/// use u_packweight::validate::validate;
///
/// let rows = vec![
///     RawRow::new("R1", "L1", "01/01/2024 08:00:00", "100"),
///     RawRow::new("R1", "L1", "01/01/2024 08:01:00", "110"),
///     RawRow::new("R1", "L1", "01/01/2024 08:02:00", "120"),
/// ];
/// let records = validate(&rows).records;
/// let baselines = estimate(&records).unwrap();
/// let devs = compute(&records, &baselines).unwrap();
/// let values: Vec<f64> = devs.iter().map(|d| d.deviation).collect();
/// assert_eq!(values, vec![-10.0, 0.0, 10.0]);
/// ```
pub fn compute(records: &[MeasurementRecord], baselines: &Baselines) -> Result<Vec<DeviationRecord>> {
    records
        .iter()
        .map(|r| {
            let baseline =
                baselines
                    .get(&r.resource_id)
                    .ok_or_else(|| PipelineError::MissingBaseline {
                        resource: r.resource_id.clone(),
                    })?;
            Ok(DeviationRecord {
                resource_id: r.resource_id.clone(),
                lot_id: r.lot_id.clone(),
                timestamp: r.timestamp,
                pack_weight: r.pack_weight,
                median_weight: baseline.median_weight,
                deviation: r.pack_weight - baseline.median_weight,
            })
        })
        .collect()
}
