//! Measurement rows, before and after validation.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Field;

/// One untyped row of the input table.
///
/// Every field is the raw cell text. Absent cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub resource: String,
    pub lot: String,
    pub timestamp: String,
    pub pack_weight: String,
    /// First required cell whose bytes were not UTF-8. That cell holds a
    /// lossy decoding and the row is rejected by validation.
    pub undecodable: Option<Field>,
}

impl RawRow {
    /// Builds a row from cell texts in `Resource, LOT, Timestamp, PackWeight`
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_packweight::record::RawRow;
    ///
    /// let row = RawRow::new("R1", "L7", "01/02/2024 08:00:00", "1002.5");
    /// assert_eq!(row.resource, "R1");
    /// assert_eq!(row.pack_weight, "1002.5");
    /// ```
    pub fn new(
        resource: impl Into<String>,
        lot: impl Into<String>,
        timestamp: impl Into<String>,
        pack_weight: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            lot: lot.into(),
            timestamp: timestamp.into(),
            pack_weight: pack_weight.into(),
            undecodable: None,
        }
    }
}

/// A validated pack-weight measurement.
///
/// # Invariants
///
/// - `pack_weight` is finite
/// - `resource_id` is non-empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub resource_id: String,
    pub lot_id: String,
    pub timestamp: NaiveDateTime,
    pub pack_weight: f64,
}
