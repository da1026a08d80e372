use serde::Serialize;

use super::model::PointCloud;
use crate::error::{BoundaryError, Result};

// ---------------------------------------------------------------------------
// Standard scaling: zero mean, unit variance per axis
// ---------------------------------------------------------------------------

/// Per-axis mean and standard deviation learned from a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardScaler {
    pub mean: [f64; 2],
    pub std: [f64; 2],
}

impl StandardScaler {
    /// Learn mean and (population) standard deviation for both axes.
    pub fn fit(cloud: &PointCloud) -> Result<Self> {
        if cloud.is_empty() {
            return Err(BoundaryError::EmptyInput("cannot scale an empty point cloud".into()));
        }
        let n = cloud.len() as f64;
        let mut mean = [0.0; 2];
        for p in &cloud.points {
            mean[0] += p[0];
            mean[1] += p[1];
        }
        mean[0] /= n;
        mean[1] /= n;

        let mut var = [0.0; 2];
        for p in &cloud.points {
            var[0] += (p[0] - mean[0]).powi(2);
            var[1] += (p[1] - mean[1]).powi(2);
        }
        let std = [(var[0] / n).sqrt(), (var[1] / n).sqrt()];
        for (axis, s) in std.iter().enumerate() {
            if *s < f64::EPSILON {
                return Err(BoundaryError::EmptyInput(format!(
                    "column '{}' has zero variance",
                    cloud.labels[axis]
                )));
            }
        }
        Ok(StandardScaler { mean, std })
    }

    pub fn transform_point(&self, p: [f64; 2]) -> [f64; 2] {
        [
            (p[0] - self.mean[0]) / self.std[0],
            (p[1] - self.mean[1]) / self.std[1],
        ]
    }

    /// Scale every point, keeping the axis labels.
    pub fn transform(&self, cloud: &PointCloud) -> PointCloud {
        PointCloud {
            points: cloud.points.iter().map(|&p| self.transform_point(p)).collect(),
            labels: cloud.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_scaled_cloud_is_standardized() {
        let cloud = PointCloud::new(vec![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]]);
        let scaler = StandardScaler::fit(&cloud).unwrap();
        let scaled = scaler.transform(&cloud);

        let mean_x: f64 = scaled.points.iter().map(|p| p[0]).sum::<f64>() / 4.0;
        let var_y: f64 = scaled.points.iter().map(|p| p[1] * p[1]).sum::<f64>() / 4.0;
        assert_abs_diff_eq!(mean_x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var_y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_rejected() {
        let cloud = PointCloud::new(vec![[1.0, 5.0], [2.0, 5.0]]);
        assert!(matches!(
            StandardScaler::fit(&cloud),
            Err(BoundaryError::EmptyInput(_))
        ));
    }
}
