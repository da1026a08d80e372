//! Minimum Covariance Determinant via FastMCD concentration steps.
//!
//! Random subsets of size `h` are concentrated (C-steps) towards the `h`
//! points with the smallest Mahalanobis distances under their own estimate.
//! The subset with the smallest covariance determinant gives the raw
//! estimate, which is then rescaled for consistency and re-weighted.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::covariance::{Gaussian2, chi2_ppf, median};

const N_TRIALS: usize = 30;
const N_BEST: usize = 10;
const TRIAL_STEPS: usize = 2;
const MAX_STEPS: usize = 30;

/// Output of a robust fit.
#[derive(Debug, Clone, PartialEq)]
pub struct McdEstimate {
    /// Best h-subset estimate, consistency-corrected.
    pub raw: Gaussian2,
    /// Estimate over the points kept by the re-weighting step.
    pub reweighted: Gaussian2,
    /// Which training points were kept by the re-weighting step.
    pub support: Vec<bool>,
}

/// Size of the subset the determinant is minimised over.
pub fn support_size(n: usize, support_fraction: Option<f64>) -> usize {
    match support_fraction {
        Some(f) => (f * n as f64).ceil() as usize,
        None => (0.5 * (n as f64 + 3.0)).ceil() as usize,
    }
}

/// Run FastMCD. Errors carry a human-readable reason.
pub fn fast_mcd(
    points: &[[f64; 2]],
    support_fraction: Option<f64>,
    seed: u64,
) -> Result<McdEstimate, String> {
    let n = points.len();
    let h = support_size(n, support_fraction).min(n);
    if h < 3 {
        return Err(format!("support of {h} points is too small (need 3)"));
    }

    let raw = if h == n {
        Gaussian2::estimate(points).ok_or("covariance of all points is singular")?
    } else {
        best_subset(points, h, seed)?
    };

    // Consistency correction.
    let dist: Vec<f64> = points.iter().map(|&p| raw.mahalanobis_sq(p)).collect();
    let correction = median(&dist) / chi2_ppf(0.5)?;
    let raw = raw
        .scaled(correction)
        .ok_or("corrected raw covariance is singular")?;

    // Re-weighting.
    let cutoff = chi2_ppf(0.975)?;
    let support: Vec<bool> = points.iter().map(|&p| raw.mahalanobis_sq(p) < cutoff).collect();
    let reweighted = Gaussian2::estimate(
        points
            .iter()
            .zip(&support)
            .filter(|&(_, &keep)| keep)
            .map(|(p, _)| p),
    )
    .ok_or("re-weighted covariance is singular")?;

    Ok(McdEstimate {
        raw,
        reweighted,
        support,
    })
}

/// Random starts, a few C-steps each, then refine the best to convergence.
fn best_subset(points: &[[f64; 2]], h: usize, seed: u64) -> Result<Gaussian2, String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = points.len();

    let mut trials: Vec<(f64, Vec<usize>)> = Vec::with_capacity(N_TRIALS);
    for _ in 0..N_TRIALS {
        let start = rand::seq::index::sample(&mut rng, n, h).into_vec();
        if let Some((g, subset)) = concentrate(points, start, h, TRIAL_STEPS) {
            trials.push((g.determinant(), subset));
        }
    }
    if trials.is_empty() {
        return Err("every random subset had a singular covariance".into());
    }
    trials.sort_by(|a, b| a.0.total_cmp(&b.0));
    trials.truncate(N_BEST);

    trials
        .into_iter()
        .filter_map(|(_, subset)| concentrate(points, subset, h, MAX_STEPS))
        .map(|(g, _)| g)
        .min_by(|a, b| a.determinant().total_cmp(&b.determinant()))
        .ok_or_else(|| "no subset converged to a non-singular covariance".to_string())
}

/// Apply C-steps until the subset stops changing or `max_steps` is reached.
fn concentrate(
    points: &[[f64; 2]],
    mut subset: Vec<usize>,
    h: usize,
    max_steps: usize,
) -> Option<(Gaussian2, Vec<usize>)> {
    subset.sort_unstable();
    let mut g = Gaussian2::estimate(subset.iter().map(|&i| &points[i]))?;

    for _ in 0..max_steps {
        let mut order: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| (g.mahalanobis_sq(p), i))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut next: Vec<usize> = order[..h].iter().map(|&(_, i)| i).collect();
        next.sort_unstable();
        if next == subset {
            break;
        }
        let candidate = Gaussian2::estimate(next.iter().map(|&i| &points[i]))?;
        if candidate.determinant() > g.determinant() {
            break;
        }
        g = candidate;
        subset = next;
    }
    Some((g, subset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contaminated() -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                pts.push([i as f64 * 0.2, j as f64 * 0.2]);
            }
        }
        // Six far-away points pulling the empirical mean.
        for k in 0..6 {
            pts.push([20.0 + k as f64, 25.0 - k as f64 * 0.5]);
        }
        pts
    }

    #[test]
    fn test_support_size_default() {
        assert_eq!(support_size(5, None), 4);
        assert_eq!(support_size(100, None), 52);
        assert_eq!(support_size(10, Some(0.75)), 8);
    }

    #[test]
    fn test_robust_location_ignores_outliers() {
        let pts = contaminated();
        let fit = fast_mcd(&pts, None, 42).unwrap();
        let empirical = Gaussian2::estimate(&pts).unwrap();

        assert!(empirical.location[0] > 2.0);
        assert!((fit.reweighted.location[0] - 0.5).abs() < 0.1);
        assert!((fit.reweighted.location[1] - 0.5).abs() < 0.1);
        // The far points are excluded by re-weighting.
        assert!(fit.support[..36].iter().all(|&s| s));
        assert!(fit.support[36..].iter().all(|&s| !s));
    }

    #[test]
    fn test_same_seed_same_estimate() {
        let pts = contaminated();
        let a = fast_mcd(&pts, None, 7).unwrap();
        let b = fast_mcd(&pts, None, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_points() {
        assert!(fast_mcd(&[[0.0, 0.0], [1.0, 1.0]], None, 0).is_err());
    }
}
