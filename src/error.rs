//! Error types for the boundary pipeline.

use thiserror::Error;

/// Errors raised by the grid builder, model adapters and boundary extractor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    /// Malformed bounding box or resolution.
    #[error("invalid grid spec: {0}")]
    InvalidGridSpec(String),

    /// An estimator could not be fit on the given point cloud.
    #[error("model '{model}' failed to fit: {reason}")]
    FitFailure { model: String, reason: String },

    /// A scorer returned a different number of scores than points queried.
    #[error("score shape mismatch: expected {expected} scores, got {got}")]
    ScoreShapeMismatch { expected: usize, got: usize },

    /// A column index outside the observation table.
    #[error("column {index} not present (table has {available} columns)")]
    MissingColumn { index: usize, available: usize },

    /// Empty or degenerate input where data was required.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A configuration value outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BoundaryError {
    pub(crate) fn fit(model: &str, reason: impl Into<String>) -> Self {
        BoundaryError::FitFailure {
            model: model.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for the core operations.
pub type Result<T> = std::result::Result<T, BoundaryError>;
