//! Descriptive statistics block (count, mean, std, min, quartiles, max).

use serde::Serialize;
use u_numflow::stats;

/// Summary of a numeric sample.
///
/// # Invariants
///
/// - `count >= 1`
/// - `min <= p25 <= p50 <= p75 <= max`
/// - `std` is `NaN` when `count == 1`, otherwise finite and `>= 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1 denominator).
    pub std: f64,
    pub min: f64,
    /// First quartile.
    #[serde(rename = "25%")]
    pub p25: f64,
    /// Median.
    #[serde(rename = "50%")]
    pub p50: f64,
    /// Third quartile.
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Computes the statistics of `data`.
    ///
    /// The sample is sorted before any arithmetic, so the result does not
    /// depend on the order of `data`. Quartiles use linear interpolation
    /// between order statistics.
    ///
    /// # Returns
    ///
    /// `None` if `data` is empty or contains non-finite values.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_packweight::aggregate::DescriptiveStats;
    ///
    /// let s = DescriptiveStats::from_sample(&[5.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(s.count, 3);
    /// assert!((s.mean - 3.0).abs() < 1e-12);
    /// assert!((s.std - 2.0).abs() < 1e-12);
    /// assert_eq!(s.min, 1.0);
    /// assert_eq!(s.p50, 3.0);
    /// assert_eq!(s.max, 5.0);
    ///
    /// let one = DescriptiveStats::from_sample(&[4.0]).unwrap();
    /// assert!(one.std.is_nan());
    /// ```
    pub fn from_sample(data: &[f64]) -> Option<Self> {
        if data.is_empty() || data.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Same as [`from_sample`](Self::from_sample) for data already sorted
    /// ascending and known to be finite.
    pub(crate) fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let n = sorted.len();
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let mean = stats::mean(sorted)?;
        let std = if n < 2 {
            f64::NAN
        } else {
            stats::std_dev(sorted)?
        };

        Some(Self {
            count: n,
            mean,
            std,
            min,
            p25: stats::quantile(sorted, 0.25)?,
            p50: stats::quantile(sorted, 0.5)?,
            p75: stats::quantile(sorted, 0.75)?,
            max,
        })
    }

    /// Interquartile range `p75 - p25`.
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}
