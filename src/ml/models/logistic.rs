use serde::{Deserialize, Serialize};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::linalg;
use crate::ml::models::{check_fit_input, sorted_classes, SupervisedModel};

/// Hyperparameters of [`LogisticRegression`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Inverse L2 penalty strength
    pub c: f64,
    /// Full-batch gradient steps
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Stop once the largest gradient component falls below this
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        LogisticConfig {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.5,
            tol: 1e-6,
        }
    }
}

/// Multinomial logistic regression trained by gradient descent
///
/// Minimises the mean cross-entropy plus `||W||² / (2·C·n)`; intercepts
/// are not penalised. Two-class problems use the same softmax model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticConfig,
    classes: Vec<String>,
    /// One weight row per class
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_iter: usize,
    fitted: bool,
}

fn softmax(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        total += *s;
    }
    for s in scores.iter_mut() {
        *s /= total;
    }
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        LogisticRegression {
            config,
            ..Default::default()
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn class_scores(&self, row: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| linalg::dot(w, row) + b)
            .collect()
    }

    /// Class membership probabilities, columns ordered as [`Self::classes`]
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(Error::NotFitted(self.name().to_string()));
        }
        x.check_width(self.weights.first().map(Vec::len).unwrap_or(0))?;

        Ok(x
            .rows()
            .iter()
            .map(|row| {
                let mut scores = self.class_scores(row);
                softmax(&mut scores);
                scores
            })
            .collect())
    }
}

impl SupervisedModel for LogisticRegression {
    type Label = String;

    fn name(&self) -> &'static str {
        "Logistic Regression"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.config.c <= 0.0 {
            return Err(Error::Config(format!(
                "LogisticRegression C must be positive, got {}",
                self.config.c
            )));
        }

        let classes = sorted_classes(y);
        if classes.len() < 2 {
            return Err(Error::InvalidInput(
                "LogisticRegression requires at least 2 distinct classes".to_string(),
            ));
        }
        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        let n = x.nrows() as f64;
        let (n_classes, n_features) = (classes.len(), x.ncols());
        let penalty = 1.0 / (self.config.c * n);

        self.classes = classes;
        self.weights = vec![vec![0.0; n_features]; n_classes];
        self.intercepts = vec![0.0; n_classes];
        self.fitted = true;
        self.n_iter = self.config.max_iter;

        for iteration in 1..=self.config.max_iter {
            let mut grad_w = vec![vec![0.0; n_features]; n_classes];
            let mut grad_b = vec![0.0; n_classes];

            for (row, &target) in x.rows().iter().zip(&targets) {
                let mut proba = self.class_scores(row);
                softmax(&mut proba);
                proba[target] -= 1.0;

                for (k, err) in proba.iter().enumerate() {
                    grad_b[k] += err / n;
                    for (g, v) in grad_w[k].iter_mut().zip(row) {
                        *g += err * v / n;
                    }
                }
            }

            let mut largest = 0.0_f64;
            for k in 0..n_classes {
                for (g, w) in grad_w[k].iter_mut().zip(&self.weights[k]) {
                    *g += penalty * w;
                    largest = largest.max(g.abs());
                }
                largest = largest.max(grad_b[k].abs());
            }

            let lr = self.config.learning_rate;
            for k in 0..n_classes {
                for (w, g) in self.weights[k].iter_mut().zip(&grad_w[k]) {
                    *w -= lr * g;
                }
                self.intercepts[k] -= lr * grad_b[k];
            }

            if largest < self.config.tol {
                self.n_iter = iteration;
                break;
            }
        }

        log::debug!(
            "LogisticRegression stopped after {} of {} steps",
            self.n_iter,
            self.config.max_iter
        );
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .iter()
            .map(|p| {
                let best = p
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, &v)| if v > p[best] { i } else { best });
                self.classes[best].clone()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut scores = vec![1.0, 2.0, 3.0];
        softmax(&mut scores);
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(scores[2] > scores[1] && scores[1] > scores[0]);
    }

    #[test]
    fn test_binary_separation() {
        let x = FeatureMatrix::from_rows(vec![
            vec![-2.0],
            vec![-1.5],
            vec![-1.0],
            vec![1.0],
            vec![1.5],
            vec![2.0],
        ])
        .unwrap();
        let y = labels(&["no", "no", "no", "yes", "yes", "yes"]);

        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[5][1] > 0.5);
        assert!((proba[0].iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_multinomial() {
        let x = FeatureMatrix::from_rows(vec![
            vec![0.0, 3.0],
            vec![0.2, 3.1],
            vec![3.0, 0.0],
            vec![3.1, 0.3],
            vec![-3.0, -3.0],
            vec![-2.8, -3.1],
        ])
        .unwrap();
        let y = labels(&["b", "b", "a", "a", "c", "c"]);

        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.classes(), &["a", "b", "c"]);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_rejects_single_class_and_unfitted() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0]]).unwrap();
        assert!(LogisticRegression::default().fit(&x, &labels(&["a", "a"])).is_err());
        assert!(matches!(
            LogisticRegression::default().predict(&x),
            Err(Error::NotFitted(_))
        ));
    }
}
