//! Diagnostics for the winning model on the held-out partition
//!
//! Reporting re-predicts with the already fitted winner and never feeds
//! back into selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::ml::metrics::{
    mean_absolute_error, r2_score, root_mean_squared_error, ClassificationReport, ConfusionMatrix,
};
use crate::ml::models::SupervisedModel;
use crate::ml::split::Split;
use crate::ml::target::TaskKind;

/// Scalar error summaries of one prediction vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionReport {
    pub fn new(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Ok(RegressionReport {
            mae: mean_absolute_error(y_true, y_pred)?,
            rmse: root_mean_squared_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAE:  {:.4}", self.mae)?;
        writeln!(f, "RMSE: {:.4}", self.rmse)?;
        write!(f, "R2:   {:.4}", self.r2)
    }
}

/// Task-appropriate diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationReport {
    Regression(RegressionReport),
    Classification {
        report: ClassificationReport<String>,
        confusion: ConfusionMatrix<String>,
    },
}

impl EvaluationReport {
    /// Re-predict the test partition with a fitted regressor
    pub fn for_regressor<M>(model: &M, split: &Split<f64>) -> Result<Self>
    where
        M: SupervisedModel<Label = f64>,
    {
        let predictions = model.predict(&split.test_features)?;
        Ok(EvaluationReport::Regression(RegressionReport::new(
            &split.test_target,
            &predictions,
        )?))
    }

    /// Re-predict the test partition with a fitted classifier
    pub fn for_classifier<M>(model: &M, split: &Split<String>) -> Result<Self>
    where
        M: SupervisedModel<Label = String>,
    {
        let predictions = model.predict(&split.test_features)?;
        let confusion = ConfusionMatrix::new(&split.test_target, &predictions)?;
        let report = ClassificationReport::from_confusion_matrix(&confusion);
        Ok(EvaluationReport::Classification { report, confusion })
    }

    pub fn task(&self) -> TaskKind {
        match self {
            EvaluationReport::Regression(_) => TaskKind::Regressor,
            EvaluationReport::Classification { .. } => TaskKind::Classifier,
        }
    }

    pub fn regression(&self) -> Option<&RegressionReport> {
        match self {
            EvaluationReport::Regression(r) => Some(r),
            EvaluationReport::Classification { .. } => None,
        }
    }

    pub fn classification(&self) -> Option<(&ClassificationReport<String>, &ConfusionMatrix<String>)> {
        match self {
            EvaluationReport::Classification { report, confusion } => Some((report, confusion)),
            EvaluationReport::Regression(_) => None,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationReport::Regression(r) => write!(f, "{}", r),
            EvaluationReport::Classification { report, confusion } => {
                writeln!(f, "{}", report)?;
                writeln!(f, "Confusion matrix (rows: actual, columns: predicted)")?;
                write!(f, "{}", confusion)
            }
        }
    }
}
