//! Closed-form linear regressors: ordinary least squares and ridge

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::linalg;
use crate::ml::models::{check_fit_input, SupervisedModel};

/// Ridge term tried when the plain normal equations are singular
const SINGULAR_FALLBACK_RIDGE: f64 = 1e-8;

/// Fitted weights of a linear model `y = w·x + b`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub feature_names: Vec<String>,
}

impl LinearCoefficients {
    /// Coefficients learned on centred data, with the intercept recovered
    /// from the feature and target means
    pub(crate) fn from_centered(
        coefficients: Vec<f64>,
        x_mean: &[f64],
        y_mean: f64,
        feature_names: &[String],
    ) -> Self {
        let intercept = y_mean - linalg::dot(x_mean, &coefficients);
        LinearCoefficients {
            coefficients,
            intercept,
            feature_names: feature_names.to_vec(),
        }
    }

    pub(crate) fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        x.check_width(self.coefficients.len())?;
        Ok(x
            .rows()
            .iter()
            .map(|row| linalg::dot(row, &self.coefficients) + self.intercept)
            .collect())
    }
}

/// Ordinary least squares
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    weights: Option<LinearCoefficients>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| w.coefficients.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.weights.as_ref().map(|w| w.intercept)
    }
}

impl SupervisedModel for LinearRegression {
    type Label = f64;

    fn name(&self) -> &'static str {
        "Linear Regression"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_fit_input(x, y)?;

        let (xc, yc, x_mean, y_mean) = linalg::center(x.rows(), y);
        let (xtx, xty) = linalg::normal_equations(&xc, &yc, 0.0);

        let coefficients = match linalg::solve(&xtx, &xty) {
            Ok(w) => w,
            Err(Error::ComputationError(_)) => {
                log::warn!(
                    "Normal equations are singular, refitting with ridge {}",
                    SINGULAR_FALLBACK_RIDGE
                );
                let (xtx, xty) = linalg::normal_equations(&xc, &yc, SINGULAR_FALLBACK_RIDGE);
                linalg::solve(&xtx, &xty)?
            }
            Err(e) => return Err(e),
        };

        self.weights = Some(LinearCoefficients::from_centered(
            coefficients,
            &x_mean,
            y_mean,
            x.column_names(),
        ));
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        self.weights
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?
            .predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

/// Hyperparameters of [`Ridge`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    /// L2 penalty strength
    pub alpha: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        RidgeConfig { alpha: 1.0 }
    }
}

/// Least squares with an L2 penalty on the coefficients; the intercept is
/// not penalised
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ridge {
    config: RidgeConfig,
    weights: Option<LinearCoefficients>,
}

impl Ridge {
    pub fn new(config: RidgeConfig) -> Self {
        Ridge {
            config,
            weights: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.config.alpha
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| w.coefficients.as_slice())
    }
}

impl SupervisedModel for Ridge {
    type Label = f64;

    fn name(&self) -> &'static str {
        "Ridge"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_fit_input(x, y)?;

        let (xc, yc, x_mean, y_mean) = linalg::center(x.rows(), y);
        let (xtx, xty) = linalg::normal_equations(&xc, &yc, self.config.alpha);
        let coefficients = linalg::solve(&xtx, &xty)?;

        self.weights = Some(LinearCoefficients::from_centered(
            coefficients,
            &x_mean,
            y_mean,
            x.column_names(),
        ));
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        self.weights
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?
            .predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_data() -> (FeatureMatrix, Vec<f64>) {
        // y = 2·x0 - 3·x1 + 1
        let rows = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 5.0],
            vec![4.0, 2.0],
        ];
        let y = rows.iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 1.0).collect();
        (FeatureMatrix::from_rows(rows).unwrap(), y)
    }

    #[test]
    fn test_ols_recovers_exact_line() {
        let (x, y) = line_data();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert!((coef[1] + 3.0).abs() < 1e-9);
        assert!((model.intercept().unwrap() - 1.0).abs() < 1e-9);

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ols_duplicate_column_falls_back() {
        let x = FeatureMatrix::from_rows(vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
        ])
        .unwrap();
        let y = vec![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let (x, y) = line_data();
        let mut ols = LinearRegression::new();
        ols.fit(&x, &y).unwrap();
        let mut ridge = Ridge::new(RidgeConfig { alpha: 10.0 });
        ridge.fit(&x, &y).unwrap();

        let norm = |c: &[f64]| c.iter().map(|v| v * v).sum::<f64>();
        assert!(norm(ridge.coefficients().unwrap()) < norm(ols.coefficients().unwrap()));
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = line_data();
        assert!(matches!(Ridge::default().predict(&x), Err(Error::NotFitted(_))));
        assert!(!LinearRegression::new().is_fitted());
    }
}
