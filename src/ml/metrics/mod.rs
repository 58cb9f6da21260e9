//! Evaluation metrics for regression and classification models

pub mod classification;
pub mod regression;

pub use classification::{accuracy_score, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use regression::{mean_absolute_error, mean_squared_error, r2_score, root_mean_squared_error};
