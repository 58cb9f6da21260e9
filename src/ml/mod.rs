//! Model selection and evaluation
//!
//! [`pipeline::Pipeline`] ties the pieces together: target selection
//! ([`target`]), partitioning ([`split`]), scaling ([`preprocessing`]),
//! candidate fitting and selection ([`models`], [`selection`]) and the final
//! diagnostics ([`report`]).

pub(crate) mod linalg;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod selection;
pub mod split;
pub mod target;

pub use pipeline::{Pipeline, PipelineOutcome, Transformer};
pub use selection::{select_best, BestResult, CandidateScore, ModelSelector, Selection};
pub use target::{TargetKind, TargetSpec, TaskKind};
