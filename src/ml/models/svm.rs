//! Kernel support vector machines
//!
//! Both estimators solve their dual problem by cyclic coordinate descent
//! over rows of the kernel matrix. The bias is absorbed into the kernel
//! (`K + 1`), which removes the equality constraint of the textbook dual
//! and lets every coordinate be updated independently.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::linalg;
use crate::ml::models::{check_fit_input, sorted_classes, SupervisedModel};

/// Largest training set whose kernel matrix is computed in full up front;
/// bigger ones compute rows on demand within the same memory budget
pub const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    /// `x · y`
    Linear,
    /// `exp(-γ ||x - y||²)`
    Rbf,
    /// `(γ x · y + coef0)^degree`
    Polynomial { degree: u32, coef0: f64 },
    /// `tanh(γ x · y + coef0)`
    Sigmoid { coef0: f64 },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Rbf
    }
}

/// How the kernel coefficient γ is chosen
///
/// Written as `"scale"`, `"auto"` or a bare number in every config format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GammaRepr", into = "GammaRepr")]
pub enum Gamma {
    /// `1 / (n_features · Var(X))`
    Scale,
    /// `1 / n_features`
    Auto,
    Value(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GammaRepr {
    Value(f64),
    Named(String),
}

impl TryFrom<GammaRepr> for Gamma {
    type Error = String;

    fn try_from(repr: GammaRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            GammaRepr::Value(g) => Ok(Gamma::Value(g)),
            GammaRepr::Named(name) => match name.as_str() {
                "scale" => Ok(Gamma::Scale),
                "auto" => Ok(Gamma::Auto),
                other => Err(format!(
                    "unknown gamma '{}', expected \"scale\", \"auto\" or a number",
                    other
                )),
            },
        }
    }
}

impl From<Gamma> for GammaRepr {
    fn from(gamma: Gamma) -> Self {
        match gamma {
            Gamma::Scale => GammaRepr::Named("scale".to_string()),
            Gamma::Auto => GammaRepr::Named("auto".to_string()),
            Gamma::Value(g) => GammaRepr::Value(g),
        }
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Gamma::Scale
    }
}

impl Gamma {
    fn resolve(&self, x: &FeatureMatrix) -> f64 {
        let p = x.ncols().max(1) as f64;
        match *self {
            Gamma::Value(g) => g,
            Gamma::Auto => 1.0 / p,
            Gamma::Scale => {
                let values: Vec<f64> = x.rows().iter().flatten().copied().collect();
                let n = values.len().max(1) as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                if var > 0.0 {
                    1.0 / (p * var)
                } else {
                    1.0
                }
            }
        }
    }
}

/// Kernel with its coefficient resolved against the training data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Kernel {
    kind: KernelType,
    gamma: f64,
}

impl Kernel {
    fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.kind {
            KernelType::Linear => linalg::dot(a, b),
            KernelType::Rbf => (-self.gamma * linalg::squared_distance(a, b)).exp(),
            KernelType::Polynomial { degree, coef0 } => {
                (self.gamma * linalg::dot(a, b) + coef0).powi(degree as i32)
            }
            KernelType::Sigmoid { coef0 } => (self.gamma * linalg::dot(a, b) + coef0).tanh(),
        }
    }

    fn augmented(&self, a: &[f64], b: &[f64]) -> f64 {
        self.eval(a, b) + 1.0
    }
}

/// Rows of `K + 1` over the training data
struct Gram<'a> {
    kernel: Kernel,
    rows: &'a [Vec<f64>],
    diagonal: Vec<f64>,
    cache: Vec<Option<Vec<f64>>>,
    capacity: usize,
    cached: usize,
}

impl<'a> Gram<'a> {
    fn new(kernel: Kernel, rows: &'a [Vec<f64>]) -> Self {
        let n = rows.len();
        let diagonal = rows.iter().map(|r| kernel.augmented(r, r)).collect();
        let mut gram = Gram {
            kernel,
            rows,
            diagonal,
            cache: vec![None; n],
            capacity: 0,
            cached: 0,
        };

        if n <= MAX_KERNEL_MATRIX_SAMPLES {
            let mut full = vec![vec![0.0; n]; n];
            for i in 0..n {
                for j in i..n {
                    let v = kernel.augmented(&rows[i], &rows[j]);
                    full[i][j] = v;
                    full[j][i] = v;
                }
            }
            gram.cache = full.into_iter().map(Some).collect();
            gram.cached = n;
            gram.capacity = n;
        } else {
            // first rows touched stay cached; cyclic sweeps revisit them in order
            gram.capacity = MAX_KERNEL_MATRIX_SAMPLES * MAX_KERNEL_MATRIX_SAMPLES / n;
            log::debug!(
                "Kernel rows computed on demand for {} samples, caching up to {}",
                n,
                gram.capacity
            );
        }
        gram
    }

    fn diagonal(&self, i: usize) -> f64 {
        self.diagonal[i]
    }

    fn compute_row(&self, i: usize) -> Vec<f64> {
        let xi = &self.rows[i];
        self.rows.iter().map(|xj| self.kernel.augmented(xi, xj)).collect()
    }

    fn row(&mut self, i: usize) -> Cow<'_, [f64]> {
        if self.cache[i].is_none() && self.cached < self.capacity {
            self.cache[i] = Some(self.compute_row(i));
            self.cached += 1;
        }
        match &self.cache[i] {
            Some(row) => Cow::Borrowed(row.as_slice()),
            None => Cow::Owned(self.compute_row(i)),
        }
    }
}

/// Hyperparameters shared by [`Svr`] and [`Svc`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Regularisation parameter
    pub c: f64,
    pub kernel: KernelType,
    pub gamma: Gamma,
    /// Half-width of the insensitive tube (regression only)
    pub epsilon: f64,
    /// Stop once no dual coordinate moves by more than this in a sweep
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig {
            c: 1.0,
            kernel: KernelType::Rbf,
            gamma: Gamma::Scale,
            epsilon: 0.1,
            tol: 1e-3,
            max_iter: 1000,
        }
    }
}

/// Support vector with its signed dual coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SupportVector {
    index: usize,
    coef: f64,
}

fn decision(kernel: &Kernel, rows: &[Vec<f64>], support: &[SupportVector], x: &[f64]) -> f64 {
    support
        .iter()
        .map(|sv| sv.coef * kernel.augmented(&rows[sv.index], x))
        .sum()
}

/// Epsilon-insensitive support vector regression
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Svr {
    config: SvmConfig,
    kernel: Option<Kernel>,
    rows: Vec<Vec<f64>>,
    support: Vec<SupportVector>,
}

impl Svr {
    pub fn new(config: SvmConfig) -> Self {
        Svr {
            config,
            ..Default::default()
        }
    }

    pub fn n_support(&self) -> usize {
        self.support.len()
    }

    /// Minimise `½ βᵀQβ - yᵀβ + ε||β||₁` subject to `-C ≤ β ≤ C`
    fn solve_dual(&self, q: &mut Gram<'_>, y: &[f64]) -> Vec<f64> {
        let n = y.len();
        let c = self.config.c;
        let eps = self.config.epsilon;
        let mut beta = vec![0.0; n];
        let mut q_beta = vec![0.0; n];

        for _ in 0..self.config.max_iter {
            let mut max_step = 0.0_f64;
            for i in 0..n {
                let qii = q.diagonal(i);
                if qii <= 0.0 {
                    continue;
                }
                let grad = q_beta[i] - y[i];
                let z = beta[i] - grad / qii;
                let shrunk = if z > eps / qii {
                    z - eps / qii
                } else if z < -eps / qii {
                    z + eps / qii
                } else {
                    0.0
                };
                let new = shrunk.clamp(-c, c);
                let delta = new - beta[i];
                if delta != 0.0 {
                    // Q is symmetric, so row i doubles as column i
                    let row = q.row(i);
                    for (qb, &qij) in q_beta.iter_mut().zip(row.iter()) {
                        *qb += qij * delta;
                    }
                    beta[i] = new;
                    max_step = max_step.max(delta.abs());
                }
            }
            if max_step < self.config.tol {
                return beta;
            }
        }

        log::warn!(
            "SVR dual did not converge in {} iterations",
            self.config.max_iter
        );
        beta
    }
}

impl SupervisedModel for Svr {
    type Label = f64;

    fn name(&self) -> &'static str {
        "Support Vector Regression"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_fit_input(x, y)?;

        let kernel = Kernel {
            kind: self.config.kernel,
            gamma: self.config.gamma.resolve(x),
        };
        let mut q = Gram::new(kernel, x.rows());
        let beta = self.solve_dual(&mut q, y);

        self.support = beta
            .into_iter()
            .enumerate()
            .filter(|(_, b)| *b != 0.0)
            .map(|(index, coef)| SupportVector { index, coef })
            .collect();
        self.rows = x.rows().to_vec();
        self.kernel = Some(kernel);
        log::debug!("SVR kept {} support vectors of {}", self.support.len(), y.len());
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        if let Some(first) = self.rows.first() {
            x.check_width(first.len())?;
        }

        Ok(x
            .rows()
            .iter()
            .map(|row| decision(kernel, &self.rows, &self.support, row))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.kernel.is_some()
    }
}

/// Binary machine separating `classes[positive]` from `classes[negative]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PairwiseMachine {
    positive: usize,
    negative: usize,
    support: Vec<SupportVector>,
}

/// Support vector classifier; multi-class problems use one-vs-one voting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Svc {
    config: SvmConfig,
    kernel: Option<Kernel>,
    classes: Vec<String>,
    rows: Vec<Vec<f64>>,
    machines: Vec<PairwiseMachine>,
}

impl Svc {
    pub fn new(config: SvmConfig) -> Self {
        Svc {
            config,
            ..Default::default()
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Minimise `½ αᵀQα - Σα` subject to `0 ≤ α ≤ C` over the rows in
    /// `members`, with `Q_ij = y_i y_j (K_ij + 1)`
    fn solve_pair(&self, k: &mut Gram<'_>, members: &[usize], signs: &[f64]) -> Vec<f64> {
        let m = members.len();
        let c = self.config.c;
        let mut alpha = vec![0.0; m];
        // gradient of the quadratic term, (Qα)_i
        let mut q_alpha = vec![0.0; m];

        for _ in 0..self.config.max_iter {
            let mut max_step = 0.0_f64;
            for a in 0..m {
                let qaa = k.diagonal(members[a]);
                if qaa <= 0.0 {
                    continue;
                }
                let grad = q_alpha[a] - 1.0;
                let new = (alpha[a] - grad / qaa).clamp(0.0, c);
                let delta = new - alpha[a];
                if delta != 0.0 {
                    let row = k.row(members[a]);
                    for b in 0..m {
                        q_alpha[b] += signs[a] * signs[b] * row[members[b]] * delta;
                    }
                    alpha[a] = new;
                    max_step = max_step.max(delta.abs());
                }
            }
            if max_step < self.config.tol {
                return alpha;
            }
        }

        log::warn!(
            "SVC dual did not converge in {} iterations",
            self.config.max_iter
        );
        alpha
    }
}

impl SupervisedModel for Svc {
    type Label = String;

    fn name(&self) -> &'static str {
        "SVC"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        check_fit_input(x, y)?;

        let classes = sorted_classes(y);
        if classes.len() < 2 {
            return Err(Error::InvalidInput(
                "SVC requires at least 2 distinct classes".to_string(),
            ));
        }
        let class_index: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        let kernel = Kernel {
            kind: self.config.kernel,
            gamma: self.config.gamma.resolve(x),
        };
        let mut k = Gram::new(kernel, x.rows());

        let mut machines = Vec::new();
        for positive in 0..classes.len() {
            for negative in positive + 1..classes.len() {
                let members: Vec<usize> = (0..y.len())
                    .filter(|&i| class_index[i] == positive || class_index[i] == negative)
                    .collect();
                let signs: Vec<f64> = members
                    .iter()
                    .map(|&i| if class_index[i] == positive { 1.0 } else { -1.0 })
                    .collect();

                let alpha = self.solve_pair(&mut k, &members, &signs);
                let support = members
                    .iter()
                    .zip(signs.iter().zip(alpha))
                    .filter(|(_, (_, a))| *a > 0.0)
                    .map(|(&index, (&sign, a))| SupportVector {
                        index,
                        coef: sign * a,
                    })
                    .collect();

                machines.push(PairwiseMachine {
                    positive,
                    negative,
                    support,
                });
            }
        }

        self.rows = x.rows().to_vec();
        self.classes = classes;
        self.machines = machines;
        self.kernel = Some(kernel);
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| Error::NotFitted(self.name().to_string()))?;
        if let Some(first) = self.rows.first() {
            x.check_width(first.len())?;
        }

        Ok(x
            .rows()
            .iter()
            .map(|row| {
                let mut votes = vec![0usize; self.classes.len()];
                for machine in &self.machines {
                    if decision(kernel, &self.rows, &machine.support, row) > 0.0 {
                        votes[machine.positive] += 1;
                    } else {
                        votes[machine.negative] += 1;
                    }
                }
                // first class wins a tied vote
                let winner = votes
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, &v)| if v > votes[best] { i } else { best });
                self.classes[winner].clone()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.kernel.is_some()
    }
}
