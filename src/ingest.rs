//! Loading raw rows from delimited text.
//!
//! The table must have a header row containing `Resource`, `LOT`, `Timestamp`
//! and `PackWeight`. Other columns (e.g. `BatchNumber`) are ignored. The
//! French header `Ressource` is accepted for `Resource`.
//!
//! Cells are read as bytes and only the required ones are decoded. A row
//! whose required cell is not UTF-8 is kept and flagged, so validation
//! rejects that row alone.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};

use crate::error::{Field, PipelineError, Result};
use crate::record::RawRow;

const RESOURCE_HEADERS: &[&str] = &["Resource", "Ressource"];
const LOT_HEADER: &str = "LOT";
const TIMESTAMP_HEADER: &str = "Timestamp";
const WEIGHT_HEADER: &str = "PackWeight";

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    resource: usize,
    lot: usize,
    timestamp: usize,
    pack_weight: usize,
}

impl Columns {
    fn locate(headers: &ByteRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = String::from_utf8_lossy(h);
                names.iter().any(|n| h.trim() == *n)
            })
        };

        let resource = find(RESOURCE_HEADERS);
        let lot = find(&[LOT_HEADER]);
        let timestamp = find(&[TIMESTAMP_HEADER]);
        let pack_weight = find(&[WEIGHT_HEADER]);

        match (resource, lot, timestamp, pack_weight) {
            (Some(resource), Some(lot), Some(timestamp), Some(pack_weight)) => Ok(Self {
                resource,
                lot,
                timestamp,
                pack_weight,
            }),
            _ => {
                let missing: Vec<&str> = [
                    (resource, RESOURCE_HEADERS[0]),
                    (lot, LOT_HEADER),
                    (timestamp, TIMESTAMP_HEADER),
                    (pack_weight, WEIGHT_HEADER),
                ]
                .iter()
                .filter(|(pos, _)| pos.is_none())
                .map(|(_, name)| *name)
                .collect();
                Err(PipelineError::InvalidInput(format!(
                    "missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn extract(&self, record: &ByteRecord) -> RawRow {
        let mut undecodable = None;
        let mut cell = |i: usize, field: Field| {
            let bytes = record.get(i).unwrap_or(b"");
            match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => {
                    if undecodable.is_none() {
                        undecodable = Some(field);
                    }
                    String::from_utf8_lossy(bytes).into_owned()
                }
            }
        };
        let resource = cell(self.resource, Field::Resource);
        let lot = cell(self.lot, Field::Lot);
        let timestamp = cell(self.timestamp, Field::Timestamp);
        let pack_weight = cell(self.pack_weight, Field::PackWeight);
        RawRow {
            resource,
            lot,
            timestamp,
            pack_weight,
            undecodable,
        }
    }
}

/// Reads every data row of a CSV document.
///
/// Short rows yield empty cells and undecodable cells are flagged rather
/// than failing the read, so the validator can report them per row.
///
/// # Errors
///
/// - [`PipelineError::InvalidInput`] if a required column is absent
/// - [`PipelineError::Csv`] on malformed CSV
///
/// # Examples
///
/// ```
/// use u_packweight::ingest::read_rows;
///
/// let text = "BatchNumber,Resource,LOT,Timestamp,PackWeight\n\
///             B1,R1,L1,01/01/2024 08:00:00,1000.5\n";
/// let rows = read_rows(text.as_bytes()).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].resource, "R1");
/// assert_eq!(rows[0].pack_weight, "1000.5");
/// ```
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::locate(rdr.byte_headers()?)?;

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        rows.push(columns.extract(&result?));
    }
    tracing::debug!(rows = rows.len(), "read input table");
    Ok(rows)
}

/// Opens `path` and reads its rows. The file is closed when this returns.
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path)?;
    tracing::info!(path = %path.display(), "loading measurements");
    read_rows(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_required_columns_in_any_order() {
        let text = "PackWeight,Timestamp,LOT,Resource\n\
                    999.5,02/03/2024 10:00:00,L2,R7\n";
        let rows = read_rows(text.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![RawRow::new("R7", "L2", "02/03/2024 10:00:00", "999.5")]
        );
    }

    #[test]
    fn accepts_french_resource_header() {
        let text = "Ressource,LOT,Timestamp,PackWeight\nR1,L1,01/01/2024 00:00:00,1\n";
        let rows = read_rows(text.as_bytes()).unwrap();
        assert_eq!(rows[0].resource, "R1");
    }

    #[test]
    fn missing_columns_are_named() {
        let text = "Resource,Timestamp\nR1,01/01/2024 00:00:00\n";
        match read_rows(text.as_bytes()) {
            Err(PipelineError::InvalidInput(msg)) => {
                assert!(msg.contains("LOT"), "{msg}");
                assert!(msg.contains("PackWeight"), "{msg}");
                assert!(!msg.contains("Timestamp"), "{msg}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn short_rows_yield_empty_cells() {
        let text = "Resource,LOT,Timestamp,PackWeight\nR1,L1\n";
        let rows = read_rows(text.as_bytes()).unwrap();
        assert_eq!(rows[0].timestamp, "");
        assert_eq!(rows[0].pack_weight, "");
    }

    #[test]
    fn non_utf8_cell_flags_its_row_only() {
        let bytes: &[u8] = b"Resource,LOT,Timestamp,PackWeight\n\
            R1,L1,01/01/2024 08:00:00,100\n\
            R1,Lot\xe9,01/01/2024 08:01:00,101\n\
            R1,L1,01/01/2024 08:02:00,102\n";
        let rows = read_rows(bytes).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].undecodable, None);
        assert_eq!(rows[1].undecodable, Some(Field::Lot));
        assert_eq!(rows[1].lot, "Lot\u{FFFD}");
        assert_eq!(rows[2].undecodable, None);

        let v = crate::validate::validate(&rows);
        assert_eq!(v.records.len(), 2);
        assert_eq!(
            v.errors,
            vec![crate::error::RowError::Encoding {
                row: 1,
                field: Field::Lot
            }]
        );
    }

    #[test]
    fn non_utf8_in_ignored_column_is_harmless() {
        let bytes: &[u8] = b"Resource,LOT,Timestamp,PackWeight,Note\n\
            R1,L1,01/01/2024 08:00:00,100,caf\xe9\n";
        let rows = read_rows(bytes).unwrap();
        assert_eq!(rows[0].undecodable, None);
    }

    #[test]
    fn header_only_table_is_empty() {
        let rows = read_rows("Resource,LOT,Timestamp,PackWeight\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_rows(Path::new("/nonexistent/measurements.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
