//! Candidate estimators and the fixed catalogues they are drawn from

pub mod coordinate_descent;
pub mod knn;
pub mod linear;
pub mod logistic;
pub mod persistence;
pub mod svm;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::target::TaskKind;

pub use coordinate_descent::{ElasticNet, ElasticNetConfig, LassoCv, LassoCvConfig};
pub use knn::{KNearestNeighbors, KnnConfig};
pub use linear::{LinearCoefficients, LinearRegression, Ridge, RidgeConfig};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use persistence::{ModelPersistence, SavedModel};
pub use svm::{Gamma, KernelType, Svc, SvmConfig, Svr, MAX_KERNEL_MATRIX_SAMPLES};

/// Uniform fit/predict capability shared by every candidate
pub trait SupervisedModel {
    /// Type of the target values
    type Label;

    /// Display name used in leaderboards and reports
    fn name(&self) -> &'static str;

    /// Learn from training features and targets
    fn fit(&mut self, x: &FeatureMatrix, y: &[Self::Label]) -> Result<()>;

    /// Predict one target per row of `x`
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<Self::Label>>;

    fn is_fitted(&self) -> bool;
}

/// Reject empty inputs and feature/target length mismatches
pub(crate) fn check_fit_input<L>(x: &FeatureMatrix, y: &[L]) -> Result<()> {
    if x.is_empty() {
        return Err(Error::EmptyData("no training rows".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(Error::InconsistentRowCount {
            expected: x.nrows(),
            found: y.len(),
        });
    }
    Ok(())
}

/// Sorted distinct labels
pub(crate) fn sorted_classes(y: &[String]) -> Vec<String> {
    let mut classes = y.to_vec();
    classes.sort();
    classes.dedup();
    classes
}

/// The regression catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum Regressor {
    LinearRegression(LinearRegression),
    Lasso(LassoCv),
    Ridge(Ridge),
    ElasticNet(ElasticNet),
    Svr(Svr),
}

impl Regressor {
    /// Fresh, unfitted candidates in declaration order
    pub fn catalogue(config: &ModelConfig) -> Vec<Regressor> {
        vec![
            Regressor::LinearRegression(LinearRegression::new()),
            Regressor::Lasso(LassoCv::new(config.lasso.clone())),
            Regressor::Ridge(Ridge::new(config.ridge.clone())),
            Regressor::ElasticNet(ElasticNet::new(config.elastic_net.clone())),
            Regressor::Svr(Svr::new(config.svr.clone())),
        ]
    }

    fn inner(&self) -> &dyn SupervisedModel<Label = f64> {
        match self {
            Regressor::LinearRegression(m) => m,
            Regressor::Lasso(m) => m,
            Regressor::Ridge(m) => m,
            Regressor::ElasticNet(m) => m,
            Regressor::Svr(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SupervisedModel<Label = f64> {
        match self {
            Regressor::LinearRegression(m) => m,
            Regressor::Lasso(m) => m,
            Regressor::Ridge(m) => m,
            Regressor::ElasticNet(m) => m,
            Regressor::Svr(m) => m,
        }
    }
}

impl SupervisedModel for Regressor {
    type Label = f64;

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

/// The classification catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    Knn(KNearestNeighbors),
    Svc(Svc),
}

impl Classifier {
    /// Fresh, unfitted candidates in declaration order
    pub fn catalogue(config: &ModelConfig) -> Vec<Classifier> {
        vec![
            Classifier::LogisticRegression(LogisticRegression::new(config.logistic.clone())),
            Classifier::Knn(KNearestNeighbors::new(config.knn.clone())),
            Classifier::Svc(Svc::new(config.svc.clone())),
        ]
    }

    fn inner(&self) -> &dyn SupervisedModel<Label = String> {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::Knn(m) => m,
            Classifier::Svc(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SupervisedModel<Label = String> {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::Knn(m) => m,
            Classifier::Svc(m) => m,
        }
    }
}

impl SupervisedModel for Classifier {
    type Label = String;

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }
}

/// Predictions of a [`FittedModel`]
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    Values(Vec<f64>),
    Labels(Vec<String>),
}

impl Predictions {
    pub fn len(&self) -> usize {
        match self {
            Predictions::Values(v) => v.len(),
            Predictions::Labels(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The winning candidate of either catalogue, ready for hand-off
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittedModel {
    Regressor(Regressor),
    Classifier(Classifier),
}

impl FittedModel {
    pub fn name(&self) -> &'static str {
        match self {
            FittedModel::Regressor(m) => m.name(),
            FittedModel::Classifier(m) => m.name(),
        }
    }

    pub fn task(&self) -> TaskKind {
        match self {
            FittedModel::Regressor(_) => TaskKind::Regressor,
            FittedModel::Classifier(_) => TaskKind::Classifier,
        }
    }

    pub fn predict(&self, x: &FeatureMatrix) -> Result<Predictions> {
        match self {
            FittedModel::Regressor(m) => m.predict(x).map(Predictions::Values),
            FittedModel::Classifier(m) => m.predict(x).map(Predictions::Labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_order_and_names() {
        let config = ModelConfig::default();
        let names: Vec<_> = Regressor::catalogue(&config).iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "Linear Regression",
                "Lasso",
                "Ridge",
                "ElasticNet",
                "Support Vector Regression"
            ]
        );

        let names: Vec<_> = Classifier::catalogue(&config).iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Logistic Regression", "KNN", "SVC"]);
    }

    #[test]
    fn test_catalogue_starts_unfitted() {
        let config = ModelConfig::default();
        assert!(Regressor::catalogue(&config).iter().all(|m| !m.is_fitted()));
        assert!(Classifier::catalogue(&config).iter().all(|m| !m.is_fitted()));
    }

    #[test]
    fn test_fitted_model_dispatch() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let mut ridge = Regressor::Ridge(Ridge::default());
        ridge.fit(&x, &[0.0, 1.0, 2.0]).unwrap();

        let model = FittedModel::Regressor(ridge);
        assert_eq!(model.task(), TaskKind::Regressor);
        assert_eq!(model.name(), "Ridge");
        assert!(matches!(model.predict(&x).unwrap(), Predictions::Values(v) if v.len() == 3));
    }

    #[test]
    fn test_check_fit_input() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0]]).unwrap();
        assert!(check_fit_input(&x, &[1.0, 2.0]).is_err());
        let empty = FeatureMatrix::from_rows(Vec::new()).unwrap();
        assert!(matches!(check_fit_input::<f64>(&empty, &[]), Err(Error::EmptyData(_))));
    }
}
