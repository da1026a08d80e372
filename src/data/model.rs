use serde::Serialize;

use crate::error::{BoundaryError, Result};

// ---------------------------------------------------------------------------
// ObservationTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An immutable table of numeric observations.
/// Every row has exactly `column_names.len()` values, all finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    column_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ObservationTable {
    /// Build a table, checking that every row matches the header width and
    /// holds no NaN or infinite cells.
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = column_names.len();
        if width == 0 {
            return Err(BoundaryError::EmptyInput("table has no columns".into()));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(BoundaryError::InvalidConfig(format!(
                "row {i} has {} values, expected {width}",
                row.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if let Some(c) = row.iter().position(|v| !v.is_finite()) {
                return Err(BoundaryError::InvalidConfig(format!(
                    "row {i}, column '{}' is {} (missing values are not allowed)",
                    column_names[c], row[c]
                )));
            }
        }
        Ok(ObservationTable { column_names, rows })
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.column_names.len()
    }

    /// Fails with `MissingColumn` if `index` is outside the table.
    pub fn check_column(&self, index: usize) -> Result<()> {
        if index >= self.width() {
            return Err(BoundaryError::MissingColumn {
                index,
                available: self.width(),
            });
        }
        Ok(())
    }

    /// Select two columns as a 2-D point cloud (the "sampler").
    pub fn select(&self, columns: [usize; 2]) -> Result<PointCloud> {
        let [cx, cy] = columns;
        self.check_column(cx)?;
        self.check_column(cy)?;
        let points = self.rows.iter().map(|r| [r[cx], r[cy]]).collect();
        Ok(PointCloud {
            points,
            labels: [
                self.column_names[cx].clone(),
                self.column_names[cy].clone(),
            ],
        })
    }
}

// ---------------------------------------------------------------------------
// PointCloud – two selected columns
// ---------------------------------------------------------------------------

/// A finite set of 2-D points with axis labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCloud {
    pub points: Vec<[f64; 2]>,
    /// Column names for the x and y axes.
    pub labels: [String; 2],
}

impl PointCloud {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        PointCloud {
            points,
            labels: ["x".to_string(), "y".to_string()],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ObservationTable {
        ObservationTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_select_columns() {
        let cloud = table().select([2, 0]).unwrap();
        assert_eq!(cloud.points, vec![[3.0, 1.0], [6.0, 4.0]]);
        assert_eq!(cloud.labels, ["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_select_missing_column() {
        let err = table().select([0, 3]).unwrap_err();
        assert_eq!(
            err,
            BoundaryError::MissingColumn {
                index: 3,
                available: 3
            }
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let res = ObservationTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![1.0]],
        );
        assert!(matches!(res, Err(BoundaryError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_cells_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let res = ObservationTable::new(
                vec!["a".into(), "b".into()],
                vec![vec![1.0, 2.0], vec![3.0, bad]],
            );
            match res {
                Err(BoundaryError::InvalidConfig(msg)) => assert!(msg.contains("'b'"), "{msg}"),
                other => panic!("expected InvalidConfig, got {other:?}"),
            }
        }
    }
}
