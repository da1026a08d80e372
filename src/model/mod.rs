/// Model adapters: a uniform fit / score surface over the outlier estimators.
///
/// ```text
///   ModelConfig ──fit(PointCloud)──► Box<dyn FittedModel> ──score(points)──► Vec<f64>
///     │
///     ├─ EmpiricalCovariance ─► covariance::Gaussian2 ─┐
///     ├─ RobustCovariance    ─► mcd::fast_mcd ─────────┴─► envelope::EllipticEnvelope
///     └─ OneClassSvm         ─► svm::OneClassSvm
/// ```
///
/// Every decision function is positive for inliers and negative for outliers.

pub mod covariance;
pub mod envelope;
pub mod mcd;
pub mod svm;

use serde::{Deserialize, Serialize};

use crate::data::model::PointCloud;
use crate::error::{BoundaryError, Result};

use covariance::Gaussian2;
use envelope::EllipticEnvelope;
use svm::{OneClassSvm, SvmParams};

// ---------------------------------------------------------------------------
// Adapter traits
// ---------------------------------------------------------------------------

/// A model bound to the point cloud it was fit on.
pub trait FittedModel: Send + Sync {
    /// One real score per point, in input order. Positive means inlier.
    fn decision_function(&self, points: &[[f64; 2]]) -> Vec<f64>;

    /// `+1` for inliers, `-1` for outliers.
    fn predict(&self, points: &[[f64; 2]]) -> Vec<i8> {
        self.decision_function(points)
            .into_iter()
            .map(|s| if s >= 0.0 { 1 } else { -1 })
            .collect()
    }
}

/// Something that can be trained on a point cloud.
pub trait Estimator {
    fn fit(&self, cloud: &PointCloud) -> Result<Box<dyn FittedModel>>;
}

/// Score `points`, checking the model returned one value per point.
pub fn score(model: &dyn FittedModel, points: &[[f64; 2]]) -> Result<Vec<f64>> {
    let scores = model.decision_function(points);
    if scores.len() != points.len() {
        return Err(BoundaryError::ScoreShapeMismatch {
            expected: points.len(),
            got: scores.len(),
        });
    }
    Ok(scores)
}

// ---------------------------------------------------------------------------
// Model configurations
// ---------------------------------------------------------------------------

/// Kernel width of the one-class SVM.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gamma {
    /// `1 / (2 · var)` of the training coordinates.
    #[default]
    Scale,
    Value(f64),
}

fn default_seed() -> u64 {
    0
}

fn default_tol() -> f64 {
    1e-3
}

fn default_max_iter() -> usize {
    1_000_000
}

/// A fully parameterised estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    /// Maximum-likelihood covariance ellipse.
    EmpiricalCovariance { contamination: f64 },
    /// Minimum Covariance Determinant ellipse.
    RobustCovariance {
        contamination: f64,
        #[serde(default)]
        support_fraction: Option<f64>,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// One-class SVM with an RBF kernel.
    OneClassSvm {
        nu: f64,
        #[serde(default)]
        gamma: Gamma,
        #[serde(default = "default_tol")]
        tol: f64,
        #[serde(default = "default_max_iter")]
        max_iter: usize,
    },
}

impl ModelConfig {
    /// Short label for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelConfig::EmpiricalCovariance { .. } => "empirical covariance",
            ModelConfig::RobustCovariance { .. } => "robust covariance",
            ModelConfig::OneClassSvm { .. } => "one-class SVM",
        }
    }

    /// Range checks on the fixed parameters.
    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, what: String| {
            if ok {
                Ok(())
            } else {
                Err(BoundaryError::InvalidConfig(what))
            }
        };
        match *self {
            ModelConfig::EmpiricalCovariance { contamination } => check(
                contamination > 0.0 && contamination <= 0.5,
                format!("contamination must be in (0, 0.5], got {contamination}"),
            ),
            ModelConfig::RobustCovariance {
                contamination,
                support_fraction,
                ..
            } => {
                check(
                    contamination > 0.0 && contamination <= 0.5,
                    format!("contamination must be in (0, 0.5], got {contamination}"),
                )?;
                match support_fraction {
                    Some(f) => check(
                        f > 0.0 && f <= 1.0,
                        format!("support_fraction must be in (0, 1], got {f}"),
                    ),
                    None => Ok(()),
                }
            }
            ModelConfig::OneClassSvm {
                nu, gamma, tol, ..
            } => {
                check(nu > 0.0 && nu <= 1.0, format!("nu must be in (0, 1], got {nu}"))?;
                check(tol > 0.0, format!("tol must be positive, got {tol}"))?;
                match gamma {
                    Gamma::Value(g) => check(g > 0.0, format!("gamma must be positive, got {g}")),
                    Gamma::Scale => Ok(()),
                }
            }
        }
    }
}

impl Estimator for ModelConfig {
    fn fit(&self, cloud: &PointCloud) -> Result<Box<dyn FittedModel>> {
        self.validate()?;
        let kind = self.kind();
        let points = &cloud.points;
        if points.len() < 3 {
            return Err(BoundaryError::fit(
                kind,
                format!("need at least 3 points, got {}", points.len()),
            ));
        }
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(BoundaryError::fit(kind, "point cloud contains non-finite values"));
        }

        match *self {
            ModelConfig::EmpiricalCovariance { contamination } => {
                let gaussian = Gaussian2::estimate(points)
                    .ok_or_else(|| BoundaryError::fit(kind, "covariance is singular"))?;
                Ok(Box::new(EllipticEnvelope::new(gaussian, points, contamination)))
            }
            ModelConfig::RobustCovariance {
                contamination,
                support_fraction,
                seed,
            } => {
                let mcd = mcd::fast_mcd(points, support_fraction, seed)
                    .map_err(|reason| BoundaryError::fit(kind, reason))?;
                log::debug!(
                    "MCD kept {} of {} points",
                    mcd.support.iter().filter(|&&s| s).count(),
                    points.len()
                );
                Ok(Box::new(EllipticEnvelope::new(
                    mcd.reweighted,
                    points,
                    contamination,
                )))
            }
            ModelConfig::OneClassSvm {
                nu,
                gamma,
                tol,
                max_iter,
            } => {
                let gamma = match gamma {
                    Gamma::Value(g) => g,
                    Gamma::Scale => svm::scale_gamma(points).ok_or_else(|| {
                        BoundaryError::fit(kind, "zero variance, cannot scale gamma")
                    })?,
                };
                let svm = OneClassSvm::train(
                    points,
                    SvmParams {
                        nu,
                        gamma,
                        tol,
                        max_iter,
                    },
                );
                log::debug!(
                    "one-class SVM: {} support vectors after {} iterations",
                    svm.support_vectors.len(),
                    svm.iterations
                );
                Ok(Box::new(svm))
            }
        }
    }
}

/// A model configuration with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedModel {
    pub name: String,
    #[serde(flatten)]
    pub config: ModelConfig,
}

impl NamedModel {
    pub fn new(name: impl Into<String>, config: ModelConfig) -> Self {
        NamedModel {
            name: name.into(),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Truncating;

    impl FittedModel for Truncating {
        fn decision_function(&self, points: &[[f64; 2]]) -> Vec<f64> {
            vec![0.0; points.len().saturating_sub(1)]
        }
    }

    fn outlier_cloud() -> PointCloud {
        PointCloud::new(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [10.0, 10.0]])
    }

    #[test]
    fn test_score_rejects_wrong_length() {
        let err = score(&Truncating, &[[0.0, 0.0], [1.0, 1.0]]).unwrap_err();
        assert_eq!(err, BoundaryError::ScoreShapeMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_predict_signs() {
        let model = ModelConfig::EmpiricalCovariance { contamination: 0.2 }
            .fit(&outlier_cloud())
            .unwrap();
        assert_eq!(model.predict(&outlier_cloud().points), vec![1, 1, 1, 1, -1]);
    }

    #[test]
    fn test_degenerate_cloud_fails_to_fit() {
        let line = PointCloud::new(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
        for config in [
            ModelConfig::EmpiricalCovariance { contamination: 0.1 },
            ModelConfig::RobustCovariance {
                contamination: 0.1,
                support_fraction: None,
                seed: 0,
            },
        ] {
            let err = config.fit(&line).err().unwrap();
            assert!(matches!(err, BoundaryError::FitFailure { .. }), "{err}");
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let bad = ModelConfig::OneClassSvm {
            nu: 0.0,
            gamma: Gamma::Scale,
            tol: 1e-3,
            max_iter: 10,
        };
        assert!(matches!(
            bad.fit(&outlier_cloud()),
            Err(BoundaryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"name": "OCSVM", "kind": "one_class_svm", "nu": 0.25, "gamma": {"value": 0.35}}"#;
        let model: NamedModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.name, "OCSVM");
        assert_eq!(
            model.config,
            ModelConfig::OneClassSvm {
                nu: 0.25,
                gamma: Gamma::Value(0.35),
                tol: 1e-3,
                max_iter: 1_000_000,
            }
        );
    }
}
