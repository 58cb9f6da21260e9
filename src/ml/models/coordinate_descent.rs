//! L1-penalised linear regressors fit by cyclic coordinate descent
//!
//! Both models minimise
//!
//! ```text
//! 1/(2n) ||y - Xw - b||² + alpha·l1_ratio·||w||₁ + alpha·(1 - l1_ratio)/2 ·||w||²
//! ```
//!
//! on centred data, so the intercept is never penalised. [`LassoCv`] fixes
//! `l1_ratio = 1` and picks `alpha` by K-fold cross-validation over a
//! log-spaced grid; [`ElasticNet`] uses the configured `alpha` directly.

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::linalg;
use crate::ml::models::linear::LinearCoefficients;
use crate::ml::models::{check_fit_input, SupervisedModel};

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

struct Descent {
    coefficients: Vec<f64>,
    iterations: usize,
    converged: bool,
}

/// Cyclic coordinate descent on centred rows, starting from `init`
fn coordinate_descent(
    xc: &[Vec<f64>],
    yc: &[f64],
    alpha: f64,
    l1_ratio: f64,
    init: Vec<f64>,
    max_iter: usize,
    tol: f64,
) -> Descent {
    let n = xc.len() as f64;
    let p = init.len();
    let l1_penalty = alpha * l1_ratio * n;
    let l2_penalty = alpha * (1.0 - l1_ratio) * n;

    let col_norms: Vec<f64> = (0..p)
        .map(|j| xc.iter().map(|row| row[j] * row[j]).sum())
        .collect();

    let mut w = init;
    let mut residual: Vec<f64> = xc
        .iter()
        .zip(yc)
        .map(|(row, &target)| target - linalg::dot(row, &w))
        .collect();

    for iteration in 1..=max_iter {
        let mut change = 0.0;

        for j in 0..p {
            let old = w[j];
            let denom = col_norms[j] + l2_penalty;
            let new = if denom < 1e-15 {
                0.0
            } else {
                let rho = xc
                    .iter()
                    .zip(&residual)
                    .map(|(row, r)| row[j] * r)
                    .sum::<f64>()
                    + col_norms[j] * old;
                soft_threshold(rho, l1_penalty) / denom
            };

            if new != old {
                let delta = old - new;
                for (r, row) in residual.iter_mut().zip(xc) {
                    *r += row[j] * delta;
                }
                change += delta.abs();
                w[j] = new;
            }
        }

        if change < tol {
            return Descent {
                coefficients: w,
                iterations: iteration,
                converged: true,
            };
        }
    }

    Descent {
        coefficients: w,
        iterations: max_iter,
        converged: false,
    }
}

/// Hyperparameters of [`ElasticNet`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticNetConfig {
    /// Overall penalty strength
    pub alpha: f64,
    /// Share of the penalty given to the L1 term, in `[0, 1]`
    pub l1_ratio: f64,
    pub max_iter: usize,
    /// Stop once the summed coefficient change of a sweep drops below this
    pub tol: f64,
}

impl Default for ElasticNetConfig {
    fn default() -> Self {
        ElasticNetConfig {
            alpha: 1.0,
            l1_ratio: 0.5,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// Linear regression with a mixed L1/L2 penalty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElasticNet {
    config: ElasticNetConfig,
    weights: Option<LinearCoefficients>,
    n_iter: usize,
}

impl ElasticNet {
    pub fn new(config: ElasticNetConfig) -> Self {
        ElasticNet {
            config,
            weights: None,
            n_iter: 0,
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| w.coefficients.as_slice())
    }

    /// Sweeps used by the last fit
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

impl SupervisedModel for ElasticNet {
    type Label = f64;

    fn name(&self) -> &'static str {
        "ElasticNet"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_fit_input(x, y)?;

        let (xc, yc, x_mean, y_mean) = linalg::center(x.rows(), y);
        let descent = coordinate_descent(
            &xc,
            &yc,
            self.config.alpha,
            self.config.l1_ratio.clamp(0.0, 1.0),
            vec![0.0; x.ncols()],
            self.config.max_iter,
            self.config.tol,
        );
        if !descent.converged {
            log::warn!(
                "ElasticNet did not converge in {} iterations",
                self.config.max_iter
            );
        }

        self.n_iter = descent.iterations;
        self.weights = Some(LinearCoefficients::from_centered(
            descent.coefficients,
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

/// Hyperparameters of [`LassoCv`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LassoCvConfig {
    /// Number of alphas on the regularisation path
    pub n_alphas: usize,
    /// Ratio `alpha_min / alpha_max` of the path
    pub eps: f64,
    /// Number of contiguous cross-validation folds
    pub folds: usize,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LassoCvConfig {
    fn default() -> Self {
        LassoCvConfig {
            n_alphas: 100,
            eps: 1e-3,
            folds: 5,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// Lasso whose penalty is chosen by cross-validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LassoCv {
    config: LassoCvConfig,
    weights: Option<LinearCoefficients>,
    /// Regularisation path, largest alpha first
    alphas: Vec<f64>,
    /// Mean held-out MSE per entry of `alphas`
    mse_path: Vec<f64>,
    alpha: Option<f64>,
}

impl LassoCv {
    pub fn new(config: LassoCvConfig) -> Self {
        LassoCv {
            config,
            ..Default::default()
        }
    }

    /// Alpha chosen by the last fit
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    pub fn mse_path(&self) -> &[f64] {
        &self.mse_path
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| w.coefficients.as_slice())
    }

    /// Log-spaced grid from `max|Xᵀy|/n` down to `eps` times that
    fn alpha_grid(&self, xc: &[Vec<f64>], yc: &[f64]) -> Vec<f64> {
        let n = xc.len() as f64;
        let p = xc.first().map(Vec::len).unwrap_or(0);
        let alpha_max = (0..p)
            .map(|j| {
                xc.iter()
                    .zip(yc)
                    .map(|(row, y)| row[j] * y)
                    .sum::<f64>()
                    .abs()
                    / n
            })
            .fold(0.0_f64, f64::max)
            .max(f64::EPSILON);

        let count = self.config.n_alphas.max(1);
        if count == 1 {
            return vec![alpha_max];
        }

        let log_max = alpha_max.ln();
        let log_min = (alpha_max * self.config.eps).ln();
        (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                (log_max + t * (log_min - log_max)).exp()
            })
            .collect()
    }

    /// Held-out MSE of every alpha on one fold, walking the path with
    /// warm starts
    fn fold_errors(
        &self,
        alphas: &[f64],
        train_rows: &[Vec<f64>],
        train_y: &[f64],
        test_rows: &[Vec<f64>],
        test_y: &[f64],
    ) -> Vec<f64> {
        let (xc, yc, x_mean, y_mean) = linalg::center(train_rows, train_y);
        let mut w = vec![0.0; x_mean.len()];

        alphas
            .iter()
            .map(|&alpha| {
                let descent = coordinate_descent(
                    &xc,
                    &yc,
                    alpha,
                    1.0,
                    w.clone(),
                    self.config.max_iter,
                    self.config.tol,
                );
                w = descent.coefficients;
                let intercept = y_mean - linalg::dot(&x_mean, &w);

                test_rows
                    .iter()
                    .zip(test_y)
                    .map(|(row, &target)| (target - linalg::dot(row, &w) - intercept).powi(2))
                    .sum::<f64>()
                    / test_y.len() as f64
            })
            .collect()
    }
}

/// Contiguous folds; the first `n % k` folds get one extra row
fn contiguous_folds(n: usize, k: usize) -> Vec<std::ops::Range<usize>> {
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

impl SupervisedModel for LassoCv {
    type Label = f64;

    fn name(&self) -> &'static str {
        "Lasso"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_fit_input(x, y)?;

        let n = x.nrows();
        let k = self.config.folds.min(n);
        if k < 2 {
            return Err(Error::InvalidInput(format!(
                "Lasso cross-validation needs at least 2 rows and 2 folds, got {} rows",
                n
            )));
        }

        let (xc, yc, x_mean, y_mean) = linalg::center(x.rows(), y);
        let alphas = self.alpha_grid(&xc, &yc);

        let mut mse_path = vec![0.0; alphas.len()];
        for range in contiguous_folds(n, k) {
            let (mut train_rows, mut train_y) = (Vec::new(), Vec::new());
            for i in (0..n).filter(|i| !range.contains(i)) {
                train_rows.push(x.row(i).to_vec());
                train_y.push(y[i]);
            }
            let test_rows = &x.rows()[range.clone()];
            let test_y = &y[range];

            let errors = self.fold_errors(&alphas, &train_rows, &train_y, test_rows, test_y);
            for (total, err) in mse_path.iter_mut().zip(errors) {
                *total += err / k as f64;
            }
        }

        let best = mse_path
            .iter()
            .enumerate()
            .fold(0, |best, (i, &mse)| if mse < mse_path[best] { i } else { best });
        let alpha = alphas[best];
        log::debug!("Lasso cross-validation chose alpha {:.6}", alpha);

        let descent = coordinate_descent(
            &xc,
            &yc,
            alpha,
            1.0,
            vec![0.0; x.ncols()],
            self.config.max_iter,
            self.config.tol,
        );
        if !descent.converged {
            log::warn!(
                "Lasso did not converge in {} iterations (alpha {:.6})",
                self.config.max_iter,
                alpha
            );
        }

        self.weights = Some(LinearCoefficients::from_centered(
            descent.coefficients,
            &x_mean,
            y_mean,
            x.column_names(),
        ));
        self.alphas = alphas;
        self.mse_path = mse_path;
        self.alpha = Some(alpha);
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
