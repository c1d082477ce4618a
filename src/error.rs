//! Error types for the pack-weight pipeline.
//!
//! Two families:
//!
//! - [`RowError`] — recoverable, per-row problems found by the validator. They
//!   are accumulated next to the valid records and never abort a run.
//! - [`PipelineError`] — everything else. These propagate to the caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Required input field that a row was missing or could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    /// Production-line resource identifier.
    Resource,
    Lot,
    Timestamp,
    /// Measured pack weight.
    PackWeight,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Resource => write!(f, "Resource"),
            Field::Lot => write!(f, "LOT"),
            Field::Timestamp => write!(f, "Timestamp"),
            Field::PackWeight => write!(f, "PackWeight"),
        }
    }
}

/// A rejected input row.
///
/// `row` is the zero-based position of the row in the raw input, so the
/// caller can point the user at the offending line.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum RowError {
    #[error("row {row}: cannot parse timestamp '{text}'")]
    TimestampParse { row: usize, text: String },

    #[error("row {row}: missing or invalid {field}")]
    MissingField { row: usize, field: Field },

    /// A required cell held bytes that are not UTF-8 (e.g. Latin-1 text).
    #[error("row {row}: {field} is not valid UTF-8")]
    Encoding { row: usize, field: Field },
}

impl RowError {
    /// Position of the rejected row in the raw input.
    pub fn row(&self) -> usize {
        match self {
            RowError::TimestampParse { row, .. }
            | RowError::MissingField { row, .. }
            | RowError::Encoding { row, .. } => *row,
        }
    }
}

/// Errors that stop a pipeline stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input as a whole is unusable: required columns are absent, the
    /// table is empty, or every row failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record reached the deviation stage without a baseline for its
    /// resource. Baselines and records were not derived from the same set.
    #[error("no baseline for resource '{resource}'")]
    MissingBaseline { resource: String },

    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_error_messages_carry_original_text() {
        let err = RowError::TimestampParse {
            row: 3,
            text: "not-a-date".to_string(),
        };
        assert_eq!(err.row(), 3);
        assert_eq!(err.to_string(), "row 3: cannot parse timestamp 'not-a-date'");
    }

    #[test]
    fn missing_field_names_the_column() {
        let err = RowError::MissingField {
            row: 0,
            field: Field::PackWeight,
        };
        assert_eq!(err.to_string(), "row 0: missing or invalid PackWeight");
    }

    #[test]
    fn encoding_error_names_the_column() {
        let err = RowError::Encoding {
            row: 4,
            field: Field::Lot,
        };
        assert_eq!(err.row(), 4);
        assert_eq!(err.to_string(), "row 4: LOT is not valid UTF-8");
    }

    #[test]
    fn insufficient_data_message() {
        let err = PipelineError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 points, got 1"
        );
    }
}
