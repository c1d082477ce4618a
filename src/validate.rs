//! Record validation.
//!
//! Turns untyped [`RawRow`]s into [`MeasurementRecord`]s. A bad row is never
//! coerced: it is dropped and described by exactly one [`RowError`], so the
//! rest of the batch still produces a (reduced) result.
//!
//! # Examples
//!
//! ```
//! use u_packweight::record::RawRow;
//! use u_packweight::validate::validate;
//!
//! let rows = vec![
//!     RawRow::new("R1", "L1", "03/04/2024 10:15:00", "1001.0"),
//!     RawRow::new("R1", "L1", "not-a-date", "1003.0"),
//! ];
//! let v = validate(&rows);
//! assert_eq!(v.records.len(), 1);
//! assert_eq!(v.errors.len(), 1);
//! ```

use chrono::NaiveDateTime;

use crate::error::{Field, RowError};
use crate::record::{MeasurementRecord, RawRow};

/// Fixed timestamp layout: day/month/year hour:minute:second.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Outcome of validating a batch of rows.
///
/// Both sequences keep input order.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    pub records: Vec<MeasurementRecord>,
    pub errors: Vec<RowError>,
}

impl Validation {
    /// Returns `true` if at least one row was rejected.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a timestamp in [`TIMESTAMP_FORMAT`].
///
/// # Examples
///
/// ```
/// use u_packweight::validate::parse_timestamp;
///
/// let ts = parse_timestamp("31/12/2023 23:59:59").unwrap();
/// assert_eq!(ts.to_string(), "2023-12-31 23:59:59");
/// assert!(parse_timestamp("2023-12-31 23:59:59").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

/// Validates a single row at position `row`.
///
/// Undecodable cells are reported first, then field checks run before the
/// timestamp check, so a row with several problems reports one error.
pub fn validate_row(row: usize, raw: &RawRow) -> Result<MeasurementRecord, RowError> {
    if let Some(field) = raw.undecodable {
        return Err(RowError::Encoding { row, field });
    }

    let resource_id = raw.resource.trim();
    if resource_id.is_empty() {
        return Err(RowError::MissingField {
            row,
            field: Field::Resource,
        });
    }

    let pack_weight = raw
        .pack_weight
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
        .ok_or(RowError::MissingField {
            row,
            field: Field::PackWeight,
        })?;

    let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| RowError::TimestampParse {
        row,
        text: raw.timestamp.clone(),
    })?;

    Ok(MeasurementRecord {
        resource_id: resource_id.to_string(),
        lot_id: raw.lot.trim().to_string(),
        timestamp,
        pack_weight,
    })
}

/// Validates every row, splitting the batch into records and errors.
pub fn validate(raw_rows: &[RawRow]) -> Validation {
    let mut out = Validation::default();
    for (row, raw) in raw_rows.iter().enumerate() {
        match validate_row(row, raw) {
            Ok(record) => out.records.push(record),
            Err(err) => {
                tracing::warn!(row = err.row(), "rejected input: {err}");
                out.errors.push(err);
            }
        }
    }
    tracing::debug!(
        valid = out.records.len(),
        rejected = out.errors.len(),
        "validated input rows"
    );
    out
}
