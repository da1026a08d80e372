//! Two-dimensional Gaussian moments: location, covariance, precision.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Number of features every model here is fitted on.
pub const N_FEATURES: usize = 2;

/// Location and covariance of a 2-D point set, with the precision matrix
/// cached for Mahalanobis distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gaussian2 {
    pub location: [f64; 2],
    pub covariance: [[f64; 2]; 2],
    #[serde(skip)]
    precision: [[f64; 2]; 2],
}

impl Gaussian2 {
    /// Build from moments. `None` when the covariance is singular or not
    /// positive definite.
    pub fn from_moments(location: [f64; 2], covariance: [[f64; 2]; 2]) -> Option<Self> {
        let [[a, b], [c, d]] = covariance;
        let det = a * d - b * c;
        let trace = a + d;
        if !det.is_finite() || trace <= 0.0 || det <= f64::EPSILON * trace * trace {
            return None;
        }
        let precision = [[d / det, -b / det], [-c / det, a / det]];
        Some(Gaussian2 {
            location,
            covariance,
            precision,
        })
    }

    /// Maximum-likelihood estimate (normalised by `n`).
    pub fn estimate<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        let pts: Vec<[f64; 2]> = points.into_iter().copied().collect();
        if pts.len() < 3 {
            return None;
        }
        let n = pts.len() as f64;
        let mut mean = [0.0; 2];
        for p in &pts {
            mean[0] += p[0];
            mean[1] += p[1];
        }
        mean[0] /= n;
        mean[1] /= n;

        let mut cov = [[0.0; 2]; 2];
        for p in &pts {
            let dx = p[0] - mean[0];
            let dy = p[1] - mean[1];
            cov[0][0] += dx * dx;
            cov[0][1] += dx * dy;
            cov[1][1] += dy * dy;
        }
        cov[0][0] /= n;
        cov[0][1] /= n;
        cov[1][1] /= n;
        cov[1][0] = cov[0][1];
        Self::from_moments(mean, cov)
    }

    pub fn determinant(&self) -> f64 {
        let [[a, b], [c, d]] = self.covariance;
        a * d - b * c
    }

    /// Squared Mahalanobis distance of `p` from the location.
    #[inline]
    pub fn mahalanobis_sq(&self, p: [f64; 2]) -> f64 {
        let dx = p[0] - self.location[0];
        let dy = p[1] - self.location[1];
        let [[a, b], [c, d]] = self.precision;
        dx * (a * dx + b * dy) + dy * (c * dx + d * dy)
    }

    /// Same location, covariance multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Option<Self> {
        let [[a, b], [c, d]] = self.covariance;
        Self::from_moments(
            self.location,
            [[a * factor, b * factor], [c * factor, d * factor]],
        )
    }
}

/// Quantile of the chi-squared distribution with [`N_FEATURES`] degrees of
/// freedom, the distribution of squared Mahalanobis distances under a
/// Gaussian fit.
pub fn chi2_ppf(q: f64) -> Result<f64, String> {
    let dist = ChiSquared::new(N_FEATURES as f64)
        .map_err(|e| format!("chi-squared distribution: {e}"))?;
    Ok(dist.inverse_cdf(q))
}

/// Linear-interpolation percentile (`q` in [0, 100]) of unsorted values.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Median of unsorted values (mean of the middle pair for even lengths).
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_estimate_square() {
        let pts = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let g = Gaussian2::estimate(&pts).unwrap();
        assert_eq!(g.location, [0.5, 0.5]);
        assert_abs_diff_eq!(g.covariance[0][0], 0.25);
        assert_abs_diff_eq!(g.covariance[0][1], 0.0);
        assert_abs_diff_eq!(g.mahalanobis_sq([0.0, 0.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_points_are_singular() {
        let pts = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert!(Gaussian2::estimate(&pts).is_none());
    }

    #[test]
    fn test_chi2_quantiles() {
        assert_abs_diff_eq!(chi2_ppf(0.5).unwrap(), 2.0 * std::f64::consts::LN_2, epsilon = 1e-6);
        assert_abs_diff_eq!(chi2_ppf(0.975).unwrap(), 7.377758908227871, epsilon = 1e-6);
        // Two degrees of freedom: exponential with mean 2.
        for q in [0.1, 0.25, 0.9, 0.99] {
            assert_abs_diff_eq!(chi2_ppf(q).unwrap(), -2.0 * (1.0 - q).ln(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_abs_diff_eq!(percentile(&v, 20.0), 1.8, epsilon = 1e-12);
        assert_abs_diff_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5, epsilon = 1e-12);
    }
}
