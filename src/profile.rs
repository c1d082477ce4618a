//! Per-resource weight profiles.
//!
//! Box-plot summary (Tukey fences) and histogram of the pack weights of each
//! resource, as shown on a weight-analysis dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::DescriptiveStats;
use crate::distribution::{histogram, Histogram};
use crate::record::MeasurementRecord;

/// Multiplier of the IQR that places the whisker fences.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary with Tukey whiskers.
///
/// # Invariants
///
/// - `min <= lower_whisker <= q1 <= median <= q3 <= upper_whisker <= max`
/// - `outliers` are sorted and lie outside the whiskers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value not below `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value not above `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxPlot {
    /// Computes the box plot of `data`.
    ///
    /// # Returns
    ///
    /// `None` if `data` is empty or contains non-finite values.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_packweight::profile::BoxPlot;
    ///
    /// let b = BoxPlot::from_sample(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
    /// assert_eq!(b.outliers, vec![100.0]);
    /// assert_eq!(b.upper_whisker, 5.0);
    /// assert_eq!(b.max, 100.0);
    /// ```
    pub fn from_sample(data: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::from_sample(data)?;
        let iqr = stats.iqr();
        let low_fence = stats.p25 - WHISKER_IQR * iqr;
        let high_fence = stats.p75 + WHISKER_IQR * iqr;

        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);

        let inside = sorted
            .iter()
            .copied()
            .filter(|&x| x >= low_fence && x <= high_fence);
        let lower_whisker = inside.clone().next().unwrap_or(stats.p25);
        let upper_whisker = inside.last().unwrap_or(stats.p75);

        let outliers = sorted
            .into_iter()
            .filter(|&x| x < low_fence || x > high_fence)
            .collect();

        Some(Self {
            min: stats.min,
            q1: stats.p25,
            median: stats.p50,
            q3: stats.p75,
            max: stats.max,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Weight distribution of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProfile {
    pub resource_id: String,
    pub box_plot: BoxPlot,
    /// `None` when the resource has fewer than 2 weights or all weights are
    /// equal.
    pub histogram: Option<Histogram>,
}

/// Profiles every resource in `records`, sorted by resource.
pub fn profile(records: &[MeasurementRecord], histogram_bins: usize) -> Vec<WeightProfile> {
    let mut weights: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        weights
            .entry(r.resource_id.as_str())
            .or_default()
            .push(r.pack_weight);
    }

    weights
        .into_iter()
        .filter_map(|(resource, w)| {
            let box_plot = BoxPlot::from_sample(&w)?;
            Some(WeightProfile {
                resource_id: resource.to_string(),
                box_plot,
                histogram: histogram(&w, histogram_bins),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(resource: &str, weight: f64) -> MeasurementRecord {
        MeasurementRecord {
            resource_id: resource.to_string(),
            lot_id: "L1".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            pack_weight: weight,
        }
    }

    #[test]
    fn box_plot_without_outliers() {
        let b = BoxPlot::from_sample(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(b.min, 1.0);
        assert_eq!(b.max, 5.0);
        assert_eq!(b.median, 3.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
        assert!(b.outliers.is_empty());
    }

    #[test]
    fn low_and_high_outliers() {
        let b = BoxPlot::from_sample(&[-50.0, 10.0, 11.0, 12.0, 13.0, 14.0, 90.0]).unwrap();
        assert_eq!(b.outliers, vec![-50.0, 90.0]);
        assert_eq!(b.lower_whisker, 10.0);
        assert_eq!(b.upper_whisker, 14.0);
        assert!(b.min <= b.lower_whisker && b.upper_whisker <= b.max);
    }

    #[test]
    fn single_value_box_plot() {
        let b = BoxPlot::from_sample(&[7.0]).unwrap();
        assert_eq!(b.lower_whisker, 7.0);
        assert_eq!(b.upper_whisker, 7.0);
        assert!(b.outliers.is_empty());
    }

    #[test]
    fn empty_box_plot_is_none() {
        assert!(BoxPlot::from_sample(&[]).is_none());
    }

    #[test]
    fn profiles_per_resource() {
        let records = vec![
            rec("R2", 1000.0),
            rec("R1", 990.0),
            rec("R1", 1010.0),
            rec("R1", 1000.0),
        ];
        let p = profile(&records, 20);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].resource_id, "R1");
        assert_eq!(p[0].box_plot.median, 1000.0);
        let h = p[0].histogram.as_ref().unwrap();
        assert_eq!(h.counts.len(), 20);
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
        // One weight: no histogram, box plot still present.
        assert_eq!(p[1].resource_id, "R2");
        assert!(p[1].histogram.is_none());
    }
}
