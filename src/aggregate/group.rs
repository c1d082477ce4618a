//! Grouping engine for overweight deviations.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::describe::DescriptiveStats;
use crate::deviation::DeviationRecord;
use crate::error::{PipelineError, Result};

/// Date layout used for day keys in reports.
pub(crate) const DAY_FORMAT: &str = "%Y-%m-%d";

/// Dimension along which overweight records are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Resource,
    Lot,
    Day,
}

impl GroupBy {
    /// Key of `record` along this dimension.
    pub fn key_of(self, record: &DeviationRecord) -> GroupKey {
        match self {
            GroupBy::Resource => GroupKey::Resource(record.resource_id.clone()),
            GroupBy::Lot => GroupKey::Lot(record.lot_id.clone()),
            GroupBy::Day => GroupKey::Day(record.day()),
        }
    }

    /// Header of the key column in exported reports.
    pub fn column(self) -> &'static str {
        match self {
            GroupBy::Resource => "Resource",
            GroupBy::Lot => "LOT",
            GroupBy::Day => "Date",
        }
    }

    /// Inverse of [`column`](Self::column).
    pub fn from_column(name: &str) -> Option<Self> {
        match name.trim() {
            "Resource" => Some(GroupBy::Resource),
            "LOT" => Some(GroupBy::Lot),
            "Date" => Some(GroupBy::Day),
            _ => None,
        }
    }

    /// Parses a key as written by [`GroupKey`]'s `Display`.
    pub fn parse_key(self, text: &str) -> Result<GroupKey> {
        match self {
            GroupBy::Resource => Ok(GroupKey::Resource(text.to_string())),
            GroupBy::Lot => Ok(GroupKey::Lot(text.to_string())),
            GroupBy::Day => NaiveDate::parse_from_str(text.trim(), DAY_FORMAT)
                .map(GroupKey::Day)
                .map_err(|e| PipelineError::InvalidInput(format!("bad date key '{text}': {e}"))),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Resource => write!(f, "resource"),
            GroupBy::Lot => write!(f, "lot"),
            GroupBy::Day => write!(f, "day"),
        }
    }
}

/// Value of a grouping key.
///
/// Keys of one dimension order by their natural order: lexicographic for
/// identifiers, chronological for days.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Resource(String),
    Lot(String),
    Day(NaiveDate),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Resource(id) | GroupKey::Lot(id) => write!(f, "{id}"),
            GroupKey::Day(day) => write!(f, "{}", day.format(DAY_FORMAT)),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Overweight summary of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    /// Sum of the group's positive deviations.
    pub total_deviation: f64,
    #[serde(flatten)]
    pub stats: DescriptiveStats,
}

/// Sorted positive deviations of `records`: the overweight population.
pub fn overweight_values(records: &[DeviationRecord]) -> Vec<f64> {
    let mut values: Vec<f64> = records
        .iter()
        .filter(|r| r.is_overweight())
        .map(|r| r.deviation)
        .collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Groups overweight records with an arbitrary key selector.
///
/// Only records with `deviation > 0` take part. Groups come out sorted by
/// key; a key with no overweight record produces no group.
///
/// # Errors
///
/// [`PipelineError::InvalidInput`] if a deviation is not finite.
pub fn aggregate_with<F>(records: &[DeviationRecord], key_of: F) -> Result<Vec<GroupSummary>>
where
    F: Fn(&DeviationRecord) -> GroupKey,
{
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_overweight()) {
        groups.entry(key_of(r)).or_default().push(r.deviation);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, mut values) in groups {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidInput(format!(
                "non-finite deviation in group '{key}'"
            )));
        }
        values.sort_by(f64::total_cmp);
        let stats = DescriptiveStats::from_sorted(&values).ok_or_else(|| {
            PipelineError::InvalidInput(format!("cannot summarize group '{key}'"))
        })?;
        out.push(GroupSummary {
            key,
            total_deviation: values.iter().sum(),
            stats,
        });
    }
    Ok(out)
}

/// Groups overweight records along one of the standard dimensions.
///
/// # Examples
///
/// ```
/// use u_packweight::aggregate::{aggregate, GroupBy};
/// use u_packweight::baseline::estimate;
/// use u_packweight::deviation::compute;
/// use u_packweight::record::RawRow;
/// use u_packweight::validate::validate;
///
/// let rows = vec![
///     RawRow::new("R1", "L1", "01/01/2024 08:00:00", "100"),
///     RawRow::new("R1", "L1", "01/01/2024 08:01:00", "110"),
///     RawRow::new("R1", "L2", "02/01/2024 08:02:00", "120"),
/// ];
/// let records = validate(&rows).records;
/// let devs = compute(&records, &estimate(&records).unwrap()).unwrap();
///
/// let by_resource = aggregate(&devs, GroupBy::Resource).unwrap();
/// assert_eq!(by_resource.len(), 1);
/// assert_eq!(by_resource[0].total_deviation, 10.0);
///
/// let by_lot = aggregate(&devs, GroupBy::Lot).unwrap();
/// assert_eq!(by_lot[0].key.to_string(), "L2");
/// ```
pub fn aggregate(records: &[DeviationRecord], group_by: GroupBy) -> Result<Vec<GroupSummary>> {
    let out = aggregate_with(records, |r| group_by.key_of(r))?;
    tracing::debug!(%group_by, groups = out.len(), "aggregated overweight records");
    Ok(out)
}
