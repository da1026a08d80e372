//! The per-(example, model) run: select → fit → grid → score → contour.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::contour::{self, BoundarySet};
use crate::data::model::{ObservationTable, PointCloud};
use crate::data::scale::StandardScaler;
use crate::error::BoundaryError;
use crate::grid::{GridSpec, ScoreField};
use crate::model::{self, Estimator, Gamma, ModelConfig, NamedModel};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One feature-pair example: which columns, and where to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleConfig {
    pub name: String,
    /// Column indices for the x and y axes.
    pub columns: [usize; 2],
    pub grid: GridSpec,
    /// Standard-scale the point cloud before fitting.
    #[serde(default)]
    pub standardize: bool,
}

/// Examples and models, both in a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub examples: Vec<ExampleConfig>,
    pub models: Vec<NamedModel>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            examples: vec![
                ExampleConfig {
                    name: "Outlier detection: columns 1 / 2".into(),
                    columns: [1, 2],
                    grid: GridSpec {
                        x_min: 0.0,
                        x_max: 6.0,
                        y_min: 1.0,
                        y_max: 4.5,
                        nx: 500,
                        ny: 500,
                    },
                    standardize: false,
                },
                ExampleConfig {
                    name: "Outlier detection: columns 6 / 9".into(),
                    columns: [6, 9],
                    grid: GridSpec {
                        x_min: -1.0,
                        x_max: 5.5,
                        y_min: -2.5,
                        y_max: 19.0,
                        nx: 500,
                        ny: 500,
                    },
                    standardize: false,
                },
            ],
            models: vec![
                NamedModel::new(
                    "Empirical Covariance",
                    ModelConfig::EmpiricalCovariance { contamination: 0.25 },
                ),
                NamedModel::new(
                    "Robust Covariance (Minimum Covariance Determinant)",
                    ModelConfig::RobustCovariance {
                        contamination: 0.25,
                        support_fraction: None,
                        seed: 0,
                    },
                ),
                NamedModel::new(
                    "OCSVM",
                    ModelConfig::OneClassSvm {
                        nu: 0.25,
                        gamma: Gamma::Value(0.35),
                        tol: 1e-3,
                        max_iter: 1_000_000,
                    },
                ),
            ],
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing pipeline config")
    }

    /// Check grids, model parameters and column indices before any fitting.
    pub fn validate(&self, table: &ObservationTable) -> Result<(), PipelineError> {
        for ex in &self.examples {
            let at_example = |source| PipelineError {
                example: ex.name.clone(),
                model: None,
                source,
            };
            ex.grid.validate().map_err(at_example)?;
            for &c in &ex.columns {
                table.check_column(c).map_err(at_example)?;
            }
        }
        for m in &self.models {
            m.config.validate().map_err(|source| PipelineError {
                example: String::new(),
                model: Some(m.name.clone()),
                source,
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure located by example and (when relevant) model.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineError {
    pub example: String,
    pub model: Option<String>,
    pub source: BoundaryError,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, self.example.is_empty()) {
            (Some(m), true) => write!(f, "model '{m}': {}", self.source),
            (Some(m), false) => write!(f, "example '{}', model '{m}': {}", self.example, self.source),
            (None, _) => write!(f, "example '{}': {}", self.example, self.source),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Boundary of one model over one example, or why there is none.
#[derive(Debug, Clone, Serialize)]
pub struct ModelBoundary {
    pub model: String,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<BoundarySet, BoundaryError>,
}

fn serialize_outcome<S: serde::Serializer>(
    outcome: &Result<BoundarySet, BoundaryError>,
    s: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum Outcome<'a> {
        Boundary(&'a BoundarySet),
        Error(String),
    }
    match outcome {
        Ok(set) => Outcome::Boundary(set).serialize(s),
        Err(e) => Outcome::Error(e.to_string()).serialize(s),
    }
}

/// Everything a renderer needs for one example. `boundaries` follows the
/// configured model order.
#[derive(Debug, Clone, Serialize)]
pub struct ExampleResult {
    pub example: String,
    pub cloud: PointCloud,
    pub grid: GridSpec,
    pub scaler: Option<StandardScaler>,
    pub boundaries: Vec<ModelBoundary>,
}

impl ExampleResult {
    /// Per-pair failures, with location context.
    pub fn failures(&self) -> Vec<PipelineError> {
        self.boundaries
            .iter()
            .filter_map(|b| {
                b.outcome.as_ref().err().map(|e| PipelineError {
                    example: self.example.clone(),
                    model: Some(b.model.clone()),
                    source: e.clone(),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Fit one model on `cloud` and extract its decision boundary over `grid`.
pub fn boundary_for(
    config: &ModelConfig,
    cloud: &PointCloud,
    grid: &GridSpec,
) -> Result<BoundarySet, BoundaryError> {
    let fitted = config.fit(cloud)?;
    let lattice = grid.build()?;
    let scores = model::score(fitted.as_ref(), &lattice.coordinates())?;
    let field = ScoreField::from_scores(&lattice, &scores)?;
    contour::extract_decision_boundary(&field)
}

/// Run one example over every configured model, in order. Model failures are
/// kept in the result; only selection and scaling errors abort.
pub fn run_example(
    table: &ObservationTable,
    example: &ExampleConfig,
    models: &[NamedModel],
) -> Result<ExampleResult, PipelineError> {
    let at_example = |source| PipelineError {
        example: example.name.clone(),
        model: None,
        source,
    };
    example.grid.validate().map_err(at_example)?;
    let mut cloud = table.select(example.columns).map_err(at_example)?;

    let scaler = if example.standardize {
        let scaler = StandardScaler::fit(&cloud).map_err(at_example)?;
        cloud = scaler.transform(&cloud);
        Some(scaler)
    } else {
        None
    };

    log::info!(
        "Example '{}': {} points, columns {:?}",
        example.name,
        cloud.len(),
        cloud.labels
    );

    let boundaries = models
        .iter()
        .map(|m| {
            let outcome = boundary_for(&m.config, &cloud, &example.grid);
            match &outcome {
                Ok(set) => log::debug!(
                    "  {}: {} polylines",
                    m.name,
                    set.len()
                ),
                Err(e) => log::warn!("  {}: {e}", m.name),
            }
            ModelBoundary {
                model: m.name.clone(),
                outcome,
            }
        })
        .collect();

    Ok(ExampleResult {
        example: example.name.clone(),
        cloud,
        grid: example.grid,
        scaler,
        boundaries,
    })
}

/// Validate, then run every example in order.
pub fn run(
    table: &ObservationTable,
    config: &PipelineConfig,
) -> Result<Vec<ExampleResult>, PipelineError> {
    config.validate(table)?;
    config
        .examples
        .iter()
        .map(|ex| run_example(table, ex, &config.models))
        .collect()
}

/// Write results as pretty JSON.
pub fn export_json(results: &[ExampleResult], path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), results)
        .context("writing boundary JSON")?;
    Ok(())
}
