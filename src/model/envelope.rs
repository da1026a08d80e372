//! Elliptic envelope: a covariance estimate plus a contamination threshold.

use super::FittedModel;
use super::covariance::{Gaussian2, percentile};

/// A fitted ellipse. The decision function is `-d²(x) - offset`, where the
/// offset places the `contamination` fraction of training points below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticEnvelope {
    pub gaussian: Gaussian2,
    pub offset: f64,
}

impl EllipticEnvelope {
    pub fn new(gaussian: Gaussian2, training: &[[f64; 2]], contamination: f64) -> Self {
        let neg_dist: Vec<f64> = training
            .iter()
            .map(|&p| -gaussian.mahalanobis_sq(p))
            .collect();
        let offset = percentile(&neg_dist, 100.0 * contamination);
        EllipticEnvelope { gaussian, offset }
    }
}

impl FittedModel for EllipticEnvelope {
    fn decision_function(&self, points: &[[f64; 2]]) -> Vec<f64> {
        points
            .iter()
            .map(|&p| -self.gaussian.mahalanobis_sq(p) - self.offset)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contamination_fraction_below_zero() {
        let pts: Vec<[f64; 2]> = (0..10)
            .flat_map(|i| (0..10).map(move |j| [i as f64, (j * j) as f64 * 0.1]))
            .collect();
        let g = Gaussian2::estimate(&pts).unwrap();
        let env = EllipticEnvelope::new(g, &pts, 0.1);
        let below = env
            .decision_function(&pts)
            .iter()
            .filter(|&&s| s < 0.0)
            .count();
        assert!((8..=10).contains(&below), "{below} points below zero");
    }
}
