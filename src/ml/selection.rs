//! Best-of-catalogue selection
//!
//! Candidates are fit and scored one after another in declaration order.
//! The winner is the first candidate whose score is strictly greater than
//! every score before it, so ties keep the earlier candidate.

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::ml::metrics::{accuracy_score, r2_score};
use crate::ml::models::{Classifier, Regressor, SupervisedModel};
use crate::ml::split::Split;
use crate::ml::target::{TargetKind, TargetSelection, TaskKind};

/// The winning candidate together with its held-out score
#[derive(Debug, Clone)]
pub struct BestResult<M> {
    pub model: M,
    pub name: String,
    pub score: f64,
    /// Index of the winner in the catalogue
    pub position: usize,
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub score: f64,
    pub position: usize,
}

/// Outcome of evaluating a whole catalogue
#[derive(Debug, Clone)]
pub struct Selection<M> {
    pub best: BestResult<M>,
    /// Every candidate's score in declaration order
    pub leaderboard: Vec<CandidateScore>,
}

/// Fold `candidates` into the best-scoring one
///
/// `evaluate` fits and scores a single candidate. Its first error aborts the
/// fold. NaN scores never win; an empty catalogue is `EmptyData`.
pub fn select_best<M, I, F>(candidates: I, mut evaluate: F) -> Result<Selection<M>>
where
    M: SupervisedModel,
    I: IntoIterator<Item = M>,
    F: FnMut(&mut M) -> Result<f64>,
{
    let mut leaderboard = Vec::new();
    let mut seen = 0usize;

    let best = candidates.into_iter().enumerate().try_fold(
        None::<BestResult<M>>,
        |best, (position, mut model)| -> Result<Option<BestResult<M>>> {
            seen += 1;
            let score = evaluate(&mut model)?;
            let name = model.name().to_string();
            log::debug!("Candidate {} '{}' scored {:.6}", position, name, score);

            leaderboard.push(CandidateScore {
                name: name.clone(),
                score,
                position,
            });

            let best_score = best.as_ref().map_or(f64::NEG_INFINITY, |b| b.score);
            Ok(if score > best_score {
                Some(BestResult {
                    model,
                    name,
                    score,
                    position,
                })
            } else {
                best
            })
        },
    )?;

    match best {
        Some(best) => Ok(Selection { best, leaderboard }),
        None if seen == 0 => Err(Error::EmptyData(
            "candidate catalogue is empty".to_string(),
        )),
        None => Err(Error::ComputationError(
            "no candidate produced a comparable score".to_string(),
        )),
    }
}

/// Fit every candidate on the training partition and score it on the test
/// partition with `metric(y_true, y_pred)`
pub fn evaluate_catalogue<M, F>(
    candidates: Vec<M>,
    split: &Split<M::Label>,
    metric: F,
) -> Result<Selection<M>>
where
    M: SupervisedModel,
    F: Fn(&[M::Label], &[M::Label]) -> Result<f64>,
{
    select_best(candidates, |model| {
        model.fit(&split.train_features, &split.train_target)?;
        let predictions = model.predict(&split.test_features)?;
        metric(&split.test_target, &predictions)
    })
}

/// Refuse to proceed when the task kind does not fit the data
///
/// Checked before any split or fit. A regressor needs a continuous target,
/// a classifier needs a categorical or integral target, and every column
/// must be complete with numeric features.
pub fn check_readiness(task: TaskKind, selection: &TargetSelection) -> Result<()> {
    let target = &selection.spec.name;
    let mut missing = Vec::new();
    if selection.target.has_nulls() {
        missing.push(target.clone());
    }
    missing.extend(selection.features.columns_with_missing());

    let with_target = |reason: String| {
        let mut columns = vec![target.clone()];
        columns.extend(missing.iter().filter(|c| *c != target).cloned());
        Error::TaskDataMismatch {
            task: task.to_string(),
            reason,
            columns,
        }
    };

    match (task, selection.spec.kind) {
        (TaskKind::Regressor, TargetKind::Categorical) => {
            return Err(with_target(format!(
                "target '{}' holds categorical values",
                target
            )));
        }
        (TaskKind::Classifier, TargetKind::Continuous) if !selection.target.is_integral() => {
            return Err(with_target(format!(
                "target '{}' holds non-integral continuous values",
                target
            )));
        }
        _ => {}
    }

    if !missing.is_empty() {
        return Err(Error::TaskDataMismatch {
            task: task.to_string(),
            reason: "columns contain missing values".to_string(),
            columns: missing,
        });
    }

    let non_numeric = selection.features.non_numeric_columns();
    if !non_numeric.is_empty() {
        return Err(Error::TaskDataMismatch {
            task: task.to_string(),
            reason: "feature columns are not numeric".to_string(),
            columns: non_numeric,
        });
    }

    Ok(())
}

/// Runs the fixed catalogues against a prepared split
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    models: ModelConfig,
}

impl ModelSelector {
    pub fn new(models: ModelConfig) -> Self {
        ModelSelector { models }
    }

    /// Regression catalogue scored by R²
    pub fn select_regressor(&self, split: &Split<f64>) -> Result<Selection<Regressor>> {
        evaluate_catalogue(Regressor::catalogue(&self.models), split, r2_score)
    }

    /// Classification catalogue scored by accuracy
    pub fn select_classifier(&self, split: &Split<String>) -> Result<Selection<Classifier>> {
        evaluate_catalogue(Classifier::catalogue(&self.models), split, |t, p| {
            accuracy_score(t, p)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int64Column, StringColumn};
    use crate::dataset::{Dataset, FeatureMatrix};
    use crate::ml::target::select_target;

    /// Candidate whose score is fixed up front
    struct Fixed {
        name: &'static str,
        score: f64,
        fits: usize,
    }

    impl SupervisedModel for Fixed {
        type Label = f64;

        fn name(&self) -> &'static str {
            self.name
        }

        fn fit(&mut self, _x: &FeatureMatrix, _y: &[f64]) -> Result<()> {
            self.fits += 1;
            Ok(())
        }

        fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(vec![self.score; x.nrows()])
        }

        fn is_fitted(&self) -> bool {
            self.fits > 0
        }
    }

    fn fixed(scores: &[(&'static str, f64)]) -> Vec<Fixed> {
        scores
            .iter()
            .map(|&(name, score)| Fixed { name, score, fits: 0 })
            .collect()
    }

    #[test]
    fn test_tie_keeps_first_maximum() {
        let candidates = fixed(&[("a", 0.8), ("b", 0.9), ("c", 0.9)]);
        let selection = select_best(candidates, |m| Ok(m.score)).unwrap();
        assert_eq!(selection.best.name, "b");
        assert_eq!(selection.best.position, 1);
        assert_eq!(selection.best.score, 0.9);
        assert_eq!(selection.leaderboard.len(), 3);
    }

    #[test]
    fn test_nan_never_wins() {
        let candidates = fixed(&[("nan", f64::NAN), ("low", -5.0)]);
        let selection = select_best(candidates, |m| Ok(m.score)).unwrap();
        assert_eq!(selection.best.name, "low");

        let all_nan = fixed(&[("nan", f64::NAN)]);
        assert!(matches!(
            select_best(all_nan, |m| Ok(m.score)),
            Err(Error::ComputationError(_))
        ));
    }

    #[test]
    fn test_empty_catalogue() {
        let result = select_best(Vec::<Fixed>::new(), |m| Ok(m.score));
        assert!(matches!(result, Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_error_stops_the_fold() {
        let mut evaluated = 0;
        let candidates = fixed(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]);
        let result = select_best(candidates, |m| {
            evaluated += 1;
            if m.name == "b" {
                Err(Error::ComputationError("boom".to_string()))
            } else {
                Ok(m.score)
            }
        });
        assert!(result.is_err());
        assert_eq!(evaluated, 2);
    }

    #[test]
    fn test_evaluate_catalogue_fits_each_candidate_once() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let split = Split {
            train_features: x.clone(),
            train_target: vec![0.0, 1.0, 2.0],
            test_features: x,
            test_target: vec![0.0, 1.0, 2.0],
            train_indices: vec![0, 1, 2],
            test_indices: vec![0, 1, 2],
        };
        let candidates = fixed(&[("mean", 1.0), ("zero", 0.0)]);
        let selection = evaluate_catalogue(candidates, &split, r2_score).unwrap();

        assert_eq!(selection.best.name, "mean");
        assert_eq!(selection.best.model.fits, 1);
        assert_eq!(selection.leaderboard[1].name, "zero");
    }

    fn table(target: crate::column::Column) -> Dataset {
        Dataset::from_columns(vec![
            ("x", Float64Column::new(vec![1.0, 2.0, 3.0]).into()),
            (
                "gap",
                Float64Column::with_nulls(vec![1.0, 0.0, 3.0], vec![false, true, false]).into(),
            ),
            ("y", target),
        ])
        .unwrap()
    }

    #[test]
    fn test_regressor_on_categorical_target_lists_target_and_gaps() {
        let data = table(StringColumn::new(vec!["a".into(), "b".into(), "a".into()]).into());
        let selection = select_target(&data, "y").unwrap();

        match check_readiness(TaskKind::Regressor, &selection) {
            Err(Error::TaskDataMismatch { columns, task, .. }) => {
                assert_eq!(task, "regressor");
                assert_eq!(columns, vec!["y".to_string(), "gap".to_string()]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_classifier_on_fractional_target() {
        let data = table(Float64Column::new(vec![0.5, 1.5, 2.5]).into());
        let selection = select_target(&data, "y").unwrap();
        assert!(matches!(
            check_readiness(TaskKind::Classifier, &selection),
            Err(Error::TaskDataMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_values_block_matching_task() {
        let data = table(Int64Column::new(vec![0, 1, 0]).into());
        let selection = select_target(&data, "y").unwrap();

        match check_readiness(TaskKind::Classifier, &selection) {
            Err(Error::TaskDataMismatch { columns, .. }) => assert_eq!(columns, vec!["gap"]),
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_ready_data_passes() {
        let data = Dataset::from_columns(vec![
            ("x", Float64Column::new(vec![1.0, 2.0]).into()),
            ("y", Int64Column::new(vec![0, 1]).into()),
        ])
        .unwrap();
        let selection = select_target(&data, "y").unwrap();
        assert!(check_readiness(TaskKind::Regressor, &selection).is_ok());
        assert!(check_readiness(TaskKind::Classifier, &selection).is_ok());
    }
}
