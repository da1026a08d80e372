//! One-class SVM (nu formulation) with an RBF kernel.
//!
//! Dual problem: minimise `½ αᵀQα` subject to `0 ≤ αᵢ ≤ 1` and
//! `Σ αᵢ = ν·n`, where `Qᵢⱼ = exp(-γ‖xᵢ - xⱼ‖²)`. Solved with SMO using
//! second-order working-set selection. Kernel columns are computed on demand
//! so memory stays linear in the number of training points.

use super::FittedModel;
use super::covariance::N_FEATURES;

const TAU: f64 = 1e-12;

#[inline]
fn rbf(gamma: f64, a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (-gamma * (dx * dx + dy * dy)).exp()
}

/// `1 / (n_features · var)` over all coordinates of the training points.
pub fn scale_gamma(points: &[[f64; 2]]) -> Option<f64> {
    let n = (points.len() * N_FEATURES) as f64;
    let mean = points.iter().map(|p| p[0] + p[1]).sum::<f64>() / n;
    let var = points
        .iter()
        .map(|p| (p[0] - mean).powi(2) + (p[1] - mean).powi(2))
        .sum::<f64>()
        / n;
    (var > 0.0).then(|| 1.0 / (N_FEATURES as f64 * var))
}

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmParams {
    pub nu: f64,
    pub gamma: f64,
    pub tol: f64,
    pub max_iter: usize,
}

/// A trained one-class SVM: support vectors and their dual coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct OneClassSvm {
    pub support_vectors: Vec<[f64; 2]>,
    pub dual_coef: Vec<f64>,
    pub rho: f64,
    pub gamma: f64,
    /// Solver iterations used.
    pub iterations: usize,
}

impl OneClassSvm {
    /// Solve the dual on `points`.
    pub fn train(points: &[[f64; 2]], params: SvmParams) -> Self {
        let n = points.len();
        let gamma = params.gamma;
        let column = |i: usize| -> Vec<f64> {
            points.iter().map(|&p| rbf(gamma, points[i], p)).collect()
        };

        // Feasible start: the first ⌊νn⌋ coefficients at the upper bound.
        let total = params.nu * n as f64;
        let mut alpha = vec![0.0; n];
        let full = (total.floor() as usize).min(n);
        for a in alpha.iter_mut().take(full) {
            *a = 1.0;
        }
        if full < n {
            alpha[full] = total - full as f64;
        }

        let mut grad = vec![0.0; n];
        for (i, &a) in alpha.iter().enumerate() {
            if a > 0.0 {
                for (g, q) in grad.iter_mut().zip(column(i)) {
                    *g += a * q;
                }
            }
        }

        let mut iterations = 0;
        while iterations < params.max_iter {
            // i: maximal violation among coefficients that can grow.
            let mut gmax = f64::NEG_INFINITY;
            let mut sel_i = None;
            for t in 0..n {
                if alpha[t] < 1.0 && -grad[t] >= gmax {
                    gmax = -grad[t];
                    sel_i = Some(t);
                }
            }
            let Some(i) = sel_i else { break };
            let q_i = column(i);

            // j: largest second-order objective decrease among those that can shrink.
            let mut gmax2 = f64::NEG_INFINITY;
            let mut obj_min = f64::INFINITY;
            let mut sel_j = None;
            for t in 0..n {
                if alpha[t] > 0.0 {
                    gmax2 = gmax2.max(grad[t]);
                    let grad_diff = gmax + grad[t];
                    if grad_diff > 0.0 {
                        let quad = (2.0 - 2.0 * q_i[t]).max(TAU);
                        let obj = -(grad_diff * grad_diff) / quad;
                        if obj <= obj_min {
                            obj_min = obj;
                            sel_j = Some(t);
                        }
                    }
                }
            }
            if gmax + gmax2 < params.tol {
                break;
            }
            let Some(j) = sel_j else { break };
            let q_j = column(j);
            iterations += 1;

            let (old_i, old_j) = (alpha[i], alpha[j]);
            let quad = (2.0 - 2.0 * q_i[j]).max(TAU);
            let delta = (grad[i] - grad[j]) / quad;
            let sum = old_i + old_j;
            let mut ai = old_i - delta;
            let mut aj = old_j + delta;
            if sum > 1.0 {
                if ai > 1.0 {
                    ai = 1.0;
                    aj = sum - 1.0;
                }
            } else if aj < 0.0 {
                aj = 0.0;
                ai = sum;
            }
            if sum > 1.0 {
                if aj > 1.0 {
                    aj = 1.0;
                    ai = sum - 1.0;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = sum;
            }
            alpha[i] = ai;
            alpha[j] = aj;

            let (di, dj) = (ai - old_i, aj - old_j);
            for t in 0..n {
                grad[t] += q_i[t] * di + q_j[t] * dj;
            }
        }
        if iterations >= params.max_iter {
            log::warn!("one-class SVM stopped at the iteration limit ({})", params.max_iter);
        }

        let rho = compute_rho(&alpha, &grad);
        let (support_vectors, dual_coef) = points
            .iter()
            .zip(&alpha)
            .filter(|&(_, &a)| a > 0.0)
            .map(|(&p, &a)| (p, a))
            .unzip();

        OneClassSvm {
            support_vectors,
            dual_coef,
            rho,
            gamma,
            iterations,
        }
    }

    fn decision(&self, x: [f64; 2]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(&sv, &a)| a * rbf(self.gamma, sv, x))
            .sum::<f64>()
            - self.rho
    }
}

/// Offset from the gradient: mean over free coefficients, or the midpoint
/// of the feasible interval when none are free.
fn compute_rho(alpha: &[f64], grad: &[f64]) -> f64 {
    let mut ub = f64::INFINITY;
    let mut lb = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free = 0usize;
    for (&a, &g) in alpha.iter().zip(grad) {
        if a >= 1.0 {
            lb = lb.max(g);
        } else if a <= 0.0 {
            ub = ub.min(g);
        } else {
            free += 1;
            free_sum += g;
        }
    }
    if free > 0 {
        free_sum / free as f64
    } else {
        (ub + lb) / 2.0
    }
}

impl FittedModel for OneClassSvm {
    fn decision_function(&self, points: &[[f64; 2]]) -> Vec<f64> {
        points.iter().map(|&p| self.decision(p)).collect()
    }
}
