//! Per-resource baseline (expected weight) estimation.
//!
//! The baseline of a resource is the median of its pack weights, taken with
//! the same interpolated quantile routine as the p50 of
//! [`DescriptiveStats`](crate::aggregate::DescriptiveStats), so the two agree
//! exactly on the same sample.
//!
//! # Examples
//!
//! ```
//! use u_packweight::baseline::estimate;
//! use u_packweight::record::RawRow;
//! use u_packweight::validate::validate;
//!
//! let rows = vec![
//!     RawRow::new("R1", "L1", "01/01/2024 08:00:00", "100"),
//!     RawRow::new("R1", "L1", "01/01/2024 08:01:00", "120"),
//!     RawRow::new("R1", "L1", "01/01/2024 08:02:00", "110"),
//! ];
//! let records = validate(&rows).records;
//! let baselines = estimate(&records).unwrap();
//! assert_eq!(baselines["R1"].median_weight, 110.0);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use u_numflow::stats;

use crate::config::BaselineMode;
use crate::error::{PipelineError, Result};
use crate::record::MeasurementRecord;

/// Expected weight of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceBaseline {
    pub resource_id: String,
    /// Median weight, or the fixed target when one is configured.
    pub median_weight: f64,
    /// Number of records of this resource in the analysed set.
    pub sample_size: usize,
}

/// Baselines keyed by resource identifier.
pub type Baselines = BTreeMap<String, ResourceBaseline>;

/// Collects the weights of each resource.
fn weights_by_resource(records: &[MeasurementRecord]) -> BTreeMap<&str, Vec<f64>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups
            .entry(r.resource_id.as_str())
            .or_default()
            .push(r.pack_weight);
    }
    groups
}

/// Median weight per resource.
///
/// Resources with no records are absent from the result. The result depends
/// only on the multiset of weights per resource, not on record order.
///
/// # Errors
///
/// [`PipelineError::InvalidInput`] if a weight is not finite. Validated
/// records never trigger this.
pub fn estimate(records: &[MeasurementRecord]) -> Result<Baselines> {
    let mut out = Baselines::new();
    for (resource, weights) in weights_by_resource(records) {
        let median = stats::quantile(&weights, 0.5).ok_or_else(|| {
            PipelineError::InvalidInput(format!(
                "cannot compute median weight for resource '{resource}'"
            ))
        })?;
        out.insert(
            resource.to_string(),
            ResourceBaseline {
                resource_id: resource.to_string(),
                median_weight: median,
                sample_size: weights.len(),
            },
        );
    }
    tracing::debug!(resources = out.len(), "estimated median baselines");
    Ok(out)
}

/// Baselines for the configured mode.
///
/// With [`BaselineMode::Fixed`] every observed resource gets the same target;
/// resources without records are still absent.
pub fn estimate_with(records: &[MeasurementRecord], mode: BaselineMode) -> Result<Baselines> {
    match mode {
        BaselineMode::Median => estimate(records),
        BaselineMode::Fixed(target) => {
            if !target.is_finite() {
                return Err(PipelineError::InvalidConfig(
                    "fixed baseline must be finite".to_string(),
                ));
            }
            let out: Baselines = weights_by_resource(records)
                .into_iter()
                .map(|(resource, weights)| {
                    (
                        resource.to_string(),
                        ResourceBaseline {
                            resource_id: resource.to_string(),
                            median_weight: target,
                            sample_size: weights.len(),
                        },
                    )
                })
                .collect();
            tracing::debug!(resources = out.len(), target, "applied fixed baseline");
            Ok(out)
        }
    }
}
