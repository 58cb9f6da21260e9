//! Feature scaling
//!
//! Statistics are learned from the training partition only and then
//! applied unchanged to every other partition.

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::pipeline::Transformer;

/// Standardizes each feature column to zero mean and unit variance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-column means learned by `fit`
    means: Vec<f64>,
    /// Per-column population standard deviations learned by `fit`
    stds: Vec<f64>,
    /// Divisors actually used, 1.0 for constant columns
    scales: Vec<f64>,
    feature_names: Vec<String>,
    fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl Transformer for StandardScaler {
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        if x.is_empty() {
            return Err(Error::EmptyData(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let n = x.nrows() as f64;
        let mut means = Vec::with_capacity(x.ncols());
        let mut stds = Vec::with_capacity(x.ncols());

        for j in 0..x.ncols() {
            let values = x.column(j);
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            means.push(mean);
            stds.push(variance.sqrt());
        }

        self.scales = stds
            .iter()
            .map(|&s| if s > f64::EPSILON { s } else { 1.0 })
            .collect();
        self.means = means;
        self.stds = stds;
        self.feature_names = x.column_names().to_vec();
        self.fitted = true;
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        if !self.fitted {
            return Err(Error::NotFitted("StandardScaler".to_string()));
        }
        x.check_width(self.means.len())?;

        Ok(x.map_values(|j, v| (v - self.means[j]) / self.scales[j]))
    }
}
