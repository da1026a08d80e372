//! # rusty-contour
//!
//! Decision boundaries of outlier-detection models over 2-D feature slices.
//!
//! ```text
//!  ObservationTable ──select──► PointCloud ──fit──► FittedModel
//!                                                      │ score
//!  GridSpec ──build──► EvaluationGrid ─────────────────┤
//!                                                      ▼
//!                                  ScoreField ──extract──► BoundarySet
//! ```
//!
//! ```no_run
//! use rusty_contour::data::loader::load_file;
//! use rusty_contour::pipeline::{self, PipelineConfig};
//!
//! let table = load_file("wine.csv".as_ref())?;
//! for result in pipeline::run(&table, &PipelineConfig::default())? {
//!     for b in &result.boundaries {
//!         println!("{} / {}: {:?}", result.example, b.model, b.outcome.as_ref().map(|s| s.len()));
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod contour;
pub mod data;
pub mod error;
pub mod grid;
pub mod model;
pub mod pipeline;

pub use contour::{BoundarySet, Polyline};
pub use error::{BoundaryError, Result};
pub use grid::{EvaluationGrid, GridSpec, ScoreField};
pub use model::{Estimator, FittedModel, ModelConfig, NamedModel};
pub use pipeline::{ExampleConfig, ExampleResult, PipelineConfig, PipelineError};
