use serde::{Deserialize, Serialize};

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::linalg;
use crate::ml::models::{check_fit_input, SupervisedModel};

/// Hyperparameters of [`KNearestNeighbors`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    /// Number of neighbours consulted per prediction
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        KnnConfig { k: 5 }
    }
}

/// k-nearest-neighbours classifier with Euclidean distance and a uniform
/// vote
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    config: KnnConfig,
    rows: Vec<Vec<f64>>,
    labels: Vec<String>,
    fitted: bool,
}

impl KNearestNeighbors {
    pub fn new(config: KnnConfig) -> Self {
        KNearestNeighbors {
            config,
            ..Default::default()
        }
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Indices of the `k` closest training rows, nearest first; equal
    /// distances keep training order
    fn neighbors(&self, query: &[f64]) -> Vec<usize> {
        let mut by_distance: Vec<(usize, f64)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, linalg::squared_distance(row, query)))
            .collect();
        by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
        by_distance
            .into_iter()
            .take(self.config.k.min(self.rows.len()))
            .map(|(i, _)| i)
            .collect()
    }

    fn vote(&self, neighbors: &[usize]) -> String {
        let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
        for &i in neighbors {
            *counts.entry(self.labels[i].as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in label order, so the first label wins ties
        let mut winner: Option<(&str, usize)> = None;
        for (label, count) in counts {
            if winner.map_or(true, |(_, best)| count > best) {
                winner = Some((label, count));
            }
        }
        winner.map(|(label, _)| label.to_string()).unwrap_or_default()
    }
}

impl SupervisedModel for KNearestNeighbors {
    type Label = String;

    fn name(&self) -> &'static str {
        "KNN"
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[String]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.config.k == 0 {
            return Err(Error::Config("KNN k must be at least 1".to_string()));
        }

        self.rows = x.rows().to_vec();
        self.labels = y.to_vec();
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<String>> {
        if !self.fitted {
            return Err(Error::NotFitted(self.name().to_string()));
        }
        if let Some(first) = self.rows.first() {
            x.check_width(first.len())?;
        }

        Ok(x
            .rows()
            .iter()
            .map(|row| self.vote(&self.neighbors(row)))
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
    fn test_majority_of_neighbors() {
        let x = FeatureMatrix::from_rows(vec![
            vec![0.0],
            vec![0.1],
            vec![0.2],
            vec![5.0],
            vec![5.1],
            vec![5.2],
        ])
        .unwrap();
        let y = labels(&["low", "low", "low", "high", "high", "high"]);

        let mut model = KNearestNeighbors::new(KnnConfig { k: 3 });
        model.fit(&x, &y).unwrap();

        let points = FeatureMatrix::from_rows(vec![vec![0.05], vec![4.9]]).unwrap();
        assert_eq!(model.predict(&points).unwrap(), labels(&["low", "high"]));
    }

    #[test]
    fn test_tied_vote_goes_to_first_label() {
        let x = FeatureMatrix::from_rows(vec![vec![-1.0], vec![1.0]]).unwrap();
        let y = labels(&["zebra", "ant"]);

        let mut model = KNearestNeighbors::new(KnnConfig { k: 2 });
        model.fit(&x, &y).unwrap();
        let points = FeatureMatrix::from_rows(vec![vec![0.0]]).unwrap();
        assert_eq!(model.predict(&points).unwrap(), labels(&["ant"]));
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let y = labels(&["a", "b", "b"]);
        let mut model = KNearestNeighbors::default();
        assert_eq!(model.k(), 5);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), labels(&["b", "b", "b"]));
    }
}
