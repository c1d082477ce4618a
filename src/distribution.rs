//! Distribution analysis of deviations and weights.
//!
//! Normal maximum-likelihood fitting for deviation samples and fixed-width
//! histogram binning for weight profiles.
//!
//! # Examples
//!
//! ```
//! use u_packweight::distribution::{fit, histogram};
//!
//! let f = fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
//! assert!((f.mu - 5.0).abs() < 1e-12);
//! assert!((f.sigma - 2.0).abs() < 1e-12);
//!
//! let h = histogram(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
//! assert_eq!(h.counts.iter().sum::<usize>(), 4);
//! ```

use serde::Serialize;
use u_numflow::stats;

use crate::error::{PipelineError, Result};

/// Minimum sample size for a normal fit.
pub const MIN_FIT_POINTS: usize = 2;

/// Normal distribution N(mu, sigma^2) fitted by maximum likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionFit {
    /// Sample mean.
    pub mu: f64,
    /// Population standard deviation (N denominator). Zero for a constant
    /// sample.
    pub sigma: f64,
    /// Number of points in the fitted sample.
    pub n: usize,
}

impl DistributionFit {
    /// Density of the fitted normal at `x`.
    ///
    /// A degenerate fit (`sigma == 0`) is a point mass: the density is 0
    /// away from `mu` and `+inf` at `mu`.
    pub fn pdf(&self, x: f64) -> f64 {
        if self.sigma == 0.0 {
            return if x == self.mu { f64::INFINITY } else { 0.0 };
        }
        let z = (x - self.mu) / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * std::f64::consts::PI).sqrt())
    }
}

/// Fits a normal distribution to `sample` via MLE.
///
/// # Estimators
///
/// - mu = x̄ (sample mean)
/// - sigma = √((1/n) Σ(xᵢ - x̄)²) (biased MLE, not sample std dev)
///
/// The sample is sorted before summation, so the fit does not depend on
/// input order.
///
/// # Errors
///
/// - [`PipelineError::InsufficientData`] with fewer than 2 points
/// - [`PipelineError::InvalidInput`] if a value is not finite
///
/// # Examples
///
/// ```
/// use u_packweight::distribution::fit;
///
/// let f = fit(&[1.0, 1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(f.mu, 1.0);
/// assert_eq!(f.sigma, 0.0);
///
/// assert!(fit(&[3.0]).is_err());
/// ```
pub fn fit(sample: &[f64]) -> Result<DistributionFit> {
    let n = sample.len();
    if n < MIN_FIT_POINTS {
        return Err(PipelineError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: n,
        });
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::InvalidInput(
            "cannot fit a sample with non-finite values".to_string(),
        ));
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mu = stats::mean(&sorted).ok_or(PipelineError::InsufficientData {
        required: MIN_FIT_POINTS,
        actual: n,
    })?;

    // Biased MLE variance (denominator n, not n-1)
    let sum_sq: f64 = sorted.iter().map(|&x| (x - mu).powi(2)).sum();
    let sigma = (sum_sq / n as f64).sqrt();

    tracing::debug!(n, mu, sigma, "fitted normal distribution");
    Ok(DistributionFit { mu, sigma, n })
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin width.
    pub bin_width: f64,
    /// Bin edges (length = number of bins + 1).
    pub edges: Vec<f64>,
    /// Bin counts. The last bin is closed on the right.
    pub counts: Vec<usize>,
}

/// Bins `data` into `n_bins` equal-width bins spanning `[min, max]`.
///
/// # Returns
///
/// `None` if fewer than 2 data points, `n_bins == 0`, non-finite values, or
/// zero range.
pub fn histogram(data: &[f64], n_bins: usize) -> Option<Histogram> {
    if data.len() < 2 || n_bins == 0 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let min_val = data.iter().cloned().reduce(f64::min)?;
    let max_val = data.iter().cloned().reduce(f64::max)?;
    let range = max_val - min_val;

    if range < 1e-300 {
        return None; // all same value
    }

    let bin_width = range / n_bins as f64;

    let mut edges = Vec::with_capacity(n_bins + 1);
    for i in 0..=n_bins {
        edges.push(min_val + i as f64 * bin_width);
    }

    let mut counts = vec![0_usize; n_bins];
    for &x in data {
        let bin = ((x - min_val) / bin_width).floor() as usize;
        let bin = bin.min(n_bins - 1); // last point goes in last bin
        counts[bin] += 1;
    }

    Some(Histogram {
        bin_width,
        edges,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Normal fit
    // -----------------------------------------------------------------------

    #[test]
    fn fit_uses_population_sigma() {
        let f = fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((f.mu - 5.0).abs() < 1e-12);
        // Σ(x - 5)² = 32, 32 / 8 = 4
        assert!((f.sigma - 2.0).abs() < 1e-12, "sigma = {}", f.sigma);
        assert_eq!(f.n, 8);
    }

    /// Four identical points are enough data; the fit is degenerate, not an
    /// error.
    #[test]
    fn constant_sample_gives_zero_sigma() {
        let f = fit(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(f.mu, 1.0);
        assert_eq!(f.sigma, 0.0);
        assert!(!f.sigma.is_nan());
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        for sample in [&[][..], &[5.0][..]] {
            match fit(sample) {
                Err(PipelineError::InsufficientData { required, actual }) => {
                    assert_eq!(required, 2);
                    assert_eq!(actual, sample.len());
                }
                other => panic!("expected InsufficientData, got {other:?}"),
            }
        }
    }

    #[test]
    fn two_points_fit() {
        let f = fit(&[1.0, 3.0]).unwrap();
        assert!((f.mu - 2.0).abs() < 1e-12);
        assert!((f.sigma - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_sample_rejected() {
        assert!(matches!(
            fit(&[1.0, f64::NAN, 2.0]),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn pdf_peaks_at_mu() {
        let f = DistributionFit {
            mu: 0.0,
            sigma: 1.0,
            n: 10,
        };
        let peak = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert!((f.pdf(0.0) - peak).abs() < 1e-12);
        assert!(f.pdf(1.0) < f.pdf(0.0));
        assert!((f.pdf(1.0) - f.pdf(-1.0)).abs() < 1e-15);
    }

    #[test]
    fn pdf_of_degenerate_fit() {
        let f = DistributionFit {
            mu: 1.0,
            sigma: 0.0,
            n: 4,
        };
        assert_eq!(f.pdf(1.0), f64::INFINITY);
        assert_eq!(f.pdf(1.5), 0.0);
    }

    // -----------------------------------------------------------------------
    // Histogram
    // -----------------------------------------------------------------------

    #[test]
    fn histogram_edges_and_counts() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let h = histogram(&data, 5).unwrap();
        assert_eq!(h.counts.len(), 5);
        assert_eq!(h.edges.len(), 6);
        assert!((h.bin_width - 2.0).abs() < 1e-12);
        assert_eq!(h.counts, vec![2, 2, 2, 2, 3]);
    }

    #[test]
    fn histogram_max_lands_in_last_bin() {
        let h = histogram(&[0.0, 10.0], 20).unwrap();
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[19], 1);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[1.0], 20).is_none());
        assert!(histogram(&[2.0, 2.0, 2.0], 20).is_none());
        assert!(histogram(&[1.0, 2.0], 0).is_none());
        assert!(histogram(&[1.0, f64::NAN], 5).is_none());
    }
}
