//! Evaluation grids and the score fields laid out over them.

use serde::{Deserialize, Serialize};

use crate::error::{BoundaryError, Result};

// ---------------------------------------------------------------------------
// GridSpec – bounding box and resolution
// ---------------------------------------------------------------------------

/// Bounding box and resolution of an evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    /// Fails with `InvalidGridSpec` for a resolution below 2 or an empty box.
    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(BoundaryError::InvalidGridSpec(format!(
                "resolution must be at least 2x2, got {}x{}",
                self.nx, self.ny
            )));
        }
        // Negated comparisons so NaN bounds are rejected too.
        if !(self.x_min < self.x_max) {
            return Err(BoundaryError::InvalidGridSpec(format!(
                "x_min ({}) must be below x_max ({})",
                self.x_min, self.x_max
            )));
        }
        if !(self.y_min < self.y_max) {
            return Err(BoundaryError::InvalidGridSpec(format!(
                "y_min ({}) must be below y_max ({})",
                self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    /// Materialise the grid.
    pub fn build(&self) -> Result<EvaluationGrid> {
        self.validate()?;
        let xs = linspace(self.x_min, self.x_max, self.nx);
        let ys = linspace(self.y_min, self.y_max, self.ny);

        let mut points = Vec::with_capacity(self.nx * self.ny);
        for (row, &y) in ys.iter().enumerate() {
            for (col, &x) in xs.iter().enumerate() {
                points.push(GridPoint { row, col, xy: [x, y] });
            }
        }
        Ok(EvaluationGrid { xs, ys, points })
    }
}

/// `n` evenly spaced samples over `[start, end]`, both endpoints exact.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
        .collect()
}

// ---------------------------------------------------------------------------
// EvaluationGrid
// ---------------------------------------------------------------------------

/// One lattice point tagged with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub row: usize,
    pub col: usize,
    pub xy: [f64; 2],
}

/// A fully materialised rectangular lattice, row-major (`row` indexes y).
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationGrid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    points: Vec<GridPoint>,
}

impl EvaluationGrid {
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Lattice points in row-major order.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinates only, in grid order, for handing to a scorer.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.xy).collect()
    }
}

// ---------------------------------------------------------------------------
// ScoreField
// ---------------------------------------------------------------------------

/// One score per grid point, reshaped to the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreField {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Row-major: `values[row * nx + col]`.
    values: Vec<f64>,
}

impl ScoreField {
    /// Reshape scores returned in `grid.points` order back onto the lattice.
    pub fn from_scores(grid: &EvaluationGrid, scores: &[f64]) -> Result<Self> {
        if scores.len() != grid.len() {
            return Err(BoundaryError::ScoreShapeMismatch {
                expected: grid.len(),
                got: scores.len(),
            });
        }
        Ok(Self::reshape(grid, scores.iter().copied()))
    }

    /// Sample a function at every lattice point.
    pub fn from_fn(grid: &EvaluationGrid, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::reshape(grid, grid.points.iter().map(|p| f(p.xy[0], p.xy[1])))
    }

    fn reshape(grid: &EvaluationGrid, scores: impl Iterator<Item = f64>) -> Self {
        let nx = grid.nx();
        let mut values = vec![0.0; grid.len()];
        for (p, s) in grid.points.iter().zip(scores) {
            values[p.row * nx + p.col] = s;
        }
        ScoreField {
            xs: grid.xs.clone(),
            ys: grid.ys.clone(),
            values,
        }
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.nx() + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec(nx: usize, ny: usize) -> GridSpec {
        GridSpec {
            x_min: -1.0,
            x_max: 5.5,
            y_min: -2.5,
            y_max: 19.0,
            nx,
            ny,
        }
    }

    #[test]
    fn test_grid_endpoints_and_spacing() {
        let grid = spec(7, 13).build().unwrap();
        assert_eq!(grid.len(), 7 * 13);
        assert_eq!(grid.xs[0], -1.0);
        assert_eq!(*grid.xs.last().unwrap(), 5.5);
        assert_eq!(grid.ys[0], -2.5);
        assert_eq!(*grid.ys.last().unwrap(), 19.0);

        let dx = grid.xs[1] - grid.xs[0];
        for w in grid.xs.windows(2) {
            assert_relative_eq!(w[1] - w[0], dx, epsilon = 1e-12);
        }
        let dy = grid.ys[1] - grid.ys[0];
        for w in grid.ys.windows(2) {
            assert_relative_eq!(w[1] - w[0], dy, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_grid_points_are_tagged() {
        let grid = spec(3, 2).build().unwrap();
        let p = grid.points[4];
        assert_eq!((p.row, p.col), (1, 1));
        assert_eq!(p.xy, [grid.xs[1], grid.ys[1]]);
    }

    #[test]
    fn test_invalid_grid_specs() {
        assert!(matches!(spec(1, 5).build(), Err(BoundaryError::InvalidGridSpec(_))));
        assert!(matches!(spec(5, 1).build(), Err(BoundaryError::InvalidGridSpec(_))));

        let mut equal = spec(5, 5);
        equal.x_max = equal.x_min;
        assert!(matches!(equal.build(), Err(BoundaryError::InvalidGridSpec(_))));

        let mut reversed = spec(5, 5);
        reversed.x_min = 10.0;
        assert!(matches!(reversed.build(), Err(BoundaryError::InvalidGridSpec(_))));

        let mut flat_y = spec(5, 5);
        flat_y.y_min = 30.0;
        assert!(matches!(flat_y.build(), Err(BoundaryError::InvalidGridSpec(_))));
    }

    #[test]
    fn test_score_field_shape_mismatch() {
        let grid = spec(4, 4).build().unwrap();
        let err = ScoreField::from_scores(&grid, &[0.0; 15]).unwrap_err();
        assert_eq!(err, BoundaryError::ScoreShapeMismatch { expected: 16, got: 15 });
    }

    #[test]
    fn test_score_field_reshape() {
        let grid = spec(3, 2).build().unwrap();
        let scores: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let field = ScoreField::from_scores(&grid, &scores).unwrap();
        assert_eq!(field.at(1, 2), 5.0);
        assert_eq!(field.at(0, 1), 1.0);
    }

    #[test]
    fn test_degenerate_lattice_is_not_contoured() {
        let grid = EvaluationGrid {
            xs: vec![],
            ys: vec![],
            points: vec![],
        };
        let field = ScoreField::from_scores(&grid, &[]).unwrap();
        assert!(matches!(
            crate::contour::extract(&field, 0.0),
            Err(BoundaryError::InvalidGridSpec(_))
        ));

        let row = EvaluationGrid {
            xs: vec![0.0, 1.0],
            ys: vec![0.0],
            points: vec![
                GridPoint { row: 0, col: 0, xy: [0.0, 0.0] },
                GridPoint { row: 0, col: 1, xy: [1.0, 0.0] },
            ],
        };
        let field = ScoreField::from_scores(&row, &[-1.0, 1.0]).unwrap();
        assert!(matches!(
            crate::contour::extract(&field, 0.0),
            Err(BoundaryError::InvalidGridSpec(_))
        ));
    }
}
