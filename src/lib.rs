// Index-based loops mirror the matrix formulas of the solvers
#![allow(clippy::needless_range_loop)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]
#![allow(clippy::type_complexity)]

//! Automatic "try every model, keep the winner" bake-off over CSV tables
//!
//! Load a table with [`io::read_csv`], then hand it to
//! [`ml::Pipeline::run`] with a target column and a [`ml::TaskKind`]. The
//! pipeline splits, standardizes, fits a fixed catalogue of candidates and
//! returns the best one with its held-out score and a report.

pub mod column;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod ml;

pub use config::{ModelConfig, SelectionConfig, SelectionConfigBuilder};
pub use dataset::{Dataset, FeatureMatrix};
pub use error::{BakeoffError, Error, Result};
pub use io::read_csv;
pub use ml::models::{FittedModel, ModelPersistence, SavedModel};
pub use ml::{Pipeline, PipelineOutcome, TaskKind};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
