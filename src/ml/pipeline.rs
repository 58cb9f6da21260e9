//! End-to-end bake-off run
//!
//! ```text
//! Dataset → select target → readiness check → split → scale
//!         → fit/score every candidate → pick best → report
//! ```

use crate::config::SelectionConfig;
use crate::dataset::{Dataset, FeatureMatrix};
use crate::error::Result;
use crate::ml::models::{FittedModel, SavedModel};
use crate::ml::preprocessing::StandardScaler;
use crate::ml::report::EvaluationReport;
use crate::ml::selection::{check_readiness, CandidateScore, ModelSelector};
use crate::ml::split::{train_test_split, Split};
use crate::ml::target::{select_target, TargetSpec, TaskKind};

/// A stateful feature transformation
pub trait Transformer {
    /// Learn the transformation from `x`
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()>;

    /// Apply the learned transformation without changing it
    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix>;

    /// Learn from `x`, then transform it
    fn fit_transform(&mut self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Split `x`/`y` and standardize both partitions with a scaler fitted on
/// the training rows only
pub fn prepare<L: Clone>(
    x: &FeatureMatrix,
    y: &[L],
    test_fraction: f64,
    seed: u64,
) -> Result<(Split<L>, StandardScaler)> {
    let mut split = train_test_split(x, y, test_fraction, seed)?;

    let mut scaler = StandardScaler::new();
    split.train_features = scaler.fit_transform(&split.train_features)?;
    split.test_features = scaler.transform(&split.test_features)?;

    Ok((split, scaler))
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub task: TaskKind,
    pub target: TargetSpec,
    /// Feature columns in model order
    pub features: Vec<String>,
    /// The fitted winner
    pub best: FittedModel,
    pub best_score: f64,
    /// Index of the winner in its catalogue
    pub best_position: usize,
    /// Every candidate's held-out score in declaration order
    pub leaderboard: Vec<CandidateScore>,
    pub report: EvaluationReport,
    pub scaler: StandardScaler,
    pub train_size: usize,
    pub test_size: usize,
}

impl PipelineOutcome {
    pub fn best_name(&self) -> &'static str {
        self.best.name()
    }

    /// Package the winner for persistence
    pub fn saved_model(&self) -> SavedModel {
        SavedModel {
            task: self.task,
            target: self.target.name.clone(),
            features: self.features.clone(),
            scaler: self.scaler.clone(),
            model: self.best.clone(),
            score: self.best_score,
        }
    }
}

/// Runs one bake-off with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: SelectionConfig,
}

impl Pipeline {
    pub fn new(config: SelectionConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Evaluate the catalogue for `task` on `dataset` predicting `target`
    ///
    /// Fails with `InvalidTarget` before partitioning when `target` is not a
    /// column, and with `TaskDataMismatch` before any fit when the task does
    /// not fit the data.
    pub fn run(&self, dataset: &Dataset, target: &str, task: TaskKind) -> Result<PipelineOutcome> {
        self.config.validate()?;

        let selection = select_target(dataset, target)?;
        check_readiness(task, &selection)?;

        let x = selection.features.to_feature_matrix()?;
        let features = x.column_names().to_vec();
        let selector = ModelSelector::new(self.config.models.clone());
        let (fraction, seed) = (self.config.test_fraction, self.config.seed);

        log::info!(
            "Running {} bake-off on '{}' ({} rows, {} features)",
            task,
            selection.spec.name,
            x.nrows(),
            x.ncols()
        );

        let (best, best_score, best_position, leaderboard, report, scaler, sizes) = match task {
            TaskKind::Regressor => {
                let y = selection.target.to_f64_vec()?;
                let (split, scaler) = prepare(&x, &y, fraction, seed)?;
                log::info!("Split {} train / {} test rows", split.train_size(), split.test_size());

                let chosen = selector.select_regressor(&split)?;
                let report = EvaluationReport::for_regressor(&chosen.best.model, &split)?;
                (
                    FittedModel::Regressor(chosen.best.model),
                    chosen.best.score,
                    chosen.best.position,
                    chosen.leaderboard,
                    report,
                    scaler,
                    (split.train_size(), split.test_size()),
                )
            }
            TaskKind::Classifier => {
                let y = selection.target.to_label_vec()?;
                let (split, scaler) = prepare(&x, &y, fraction, seed)?;
                log::info!("Split {} train / {} test rows", split.train_size(), split.test_size());

                let chosen = selector.select_classifier(&split)?;
                let report = EvaluationReport::for_classifier(&chosen.best.model, &split)?;
                (
                    FittedModel::Classifier(chosen.best.model),
                    chosen.best.score,
                    chosen.best.position,
                    chosen.leaderboard,
                    report,
                    scaler,
                    (split.train_size(), split.test_size()),
                )
            }
        };

        log::info!("Best model: {} (score {:.4})", best.name(), best_score);

        Ok(PipelineOutcome {
            task,
            target: selection.spec,
            features,
            best,
            best_score,
            best_position,
            leaderboard,
            report,
            scaler,
            train_size: sizes.0,
            test_size: sizes.1,
        })
    }
}
