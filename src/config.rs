//! Run configuration.
//!
//! Every pipeline invocation receives an explicit [`AnalysisConfig`]; there is
//! no ambient state. Configurations can be built in code or loaded from TOML:
//!
//! ```toml
//! group_by = "lot"
//! resources = ["R1", "R4"]
//! skip_unassigned_lot = true
//! histogram_bins = 20
//!
//! [baseline]
//! fixed = 1000.0
//!
//! [window]
//! start = "2024-03-01T06:00:00"
//! end = "2024-03-01T22:00:00"
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::aggregate::GroupBy;
use crate::error::{PipelineError, Result};
use crate::record::MeasurementRecord;

/// Default histogram resolution for weight profiles.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// How the expected weight of each resource is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Median of the resource's own weights.
    #[default]
    Median,
    /// The same target weight for every resource.
    Fixed(f64),
}

/// Inclusive time window applied to record timestamps.
///
/// # Invariants
///
/// - `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = PipelineError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Creates a window. Fails if `start` is after `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_packweight::config::TimeWindow;
    /// use u_packweight::validate::parse_timestamp;
    ///
    /// let a = parse_timestamp("01/03/2024 06:00:00").unwrap();
    /// let b = parse_timestamp("01/03/2024 22:00:00").unwrap();
    /// assert!(TimeWindow::new(a, b).is_ok());
    /// assert!(TimeWindow::new(b, a).is_err());
    /// ```
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(PipelineError::InvalidConfig(format!(
                "time window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Smallest window covering every record, or `None` for an empty set.
    pub fn spanning(records: &[MeasurementRecord]) -> Option<Self> {
        let start = records.iter().map(|r| r.timestamp).min()?;
        let end = records.iter().map(|r| r.timestamp).max()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Dimension used to group overweight records.
    pub group_by: GroupBy,
    /// Resource allow-list. `None` keeps every resource.
    pub resources: Option<Vec<String>>,
    /// Inclusive timestamp filter applied before baselines are computed.
    pub window: Option<TimeWindow>,
    pub baseline: BaselineMode,
    /// Drop rows whose lot is `"0"` (not assigned to a production lot).
    pub skip_unassigned_lot: bool,
    /// Number of equal-width bins in each weight histogram.
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Resource,
            resources: None,
            window: None,
            baseline: BaselineMode::Median,
            skip_unassigned_lot: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl AnalysisConfig {
    /// Sets the grouping dimension.
    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Restricts the run to the given resources.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = Some(resources.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_baseline(mut self, baseline: BaselineMode) -> Self {
        self.baseline = baseline;
        self
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks values serde cannot express as types.
    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(PipelineError::InvalidConfig(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if let BaselineMode::Fixed(target) = self.baseline {
            if !target.is_finite() {
                return Err(PipelineError::InvalidConfig(
                    "fixed baseline must be finite".to_string(),
                ));
            }
        }
        if let Some(resources) = &self.resources {
            if resources.iter().any(|r| r.trim().is_empty()) {
                return Err(PipelineError::InvalidConfig(
                    "resource allow-list contains an empty identifier".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Returns `true` if the record passes the allow-list, window and lot
    /// filters.
    pub fn admits(&self, record: &MeasurementRecord) -> bool {
        if self.skip_unassigned_lot && record.lot_id == "0" {
            return false;
        }
        if let Some(resources) = &self.resources {
            if !resources.iter().any(|r| r == &record.resource_id) {
                return false;
            }
        }
        match &self.window {
            Some(window) => window.contains(record.timestamp),
            None => true,
        }
    }
}
