//! Deterministic train/test partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};

/// Fraction of rows held out for scoring
pub const DEFAULT_TEST_FRACTION: f64 = 0.3;

/// Seed used for the row permutation
pub const DEFAULT_SEED: u64 = 101;

/// Four disjoint-by-row partitions of one run's data
#[derive(Debug, Clone, PartialEq)]
pub struct Split<L> {
    pub train_features: FeatureMatrix,
    pub train_target: Vec<L>,
    pub test_features: FeatureMatrix,
    pub test_target: Vec<L>,
    /// Original row index of every training row
    pub train_indices: Vec<usize>,
    /// Original row index of every test row
    pub test_indices: Vec<usize>,
}

impl<L> Split<L> {
    pub fn train_size(&self) -> usize {
        self.train_target.len()
    }

    pub fn test_size(&self) -> usize {
        self.test_target.len()
    }
}

/// Number of test rows for `n_rows` rows: `ceil(test_fraction * n_rows)`
pub fn test_size_for(n_rows: usize, test_fraction: f64) -> Result<usize> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::InvalidInput(format!(
            "test fraction must lie strictly between 0 and 1, got {}",
            test_fraction
        )));
    }

    let n_test = (test_fraction * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(Error::InvalidInput(format!(
            "cannot split {} rows with test fraction {}: both partitions need at least one row",
            n_rows, test_fraction
        )));
    }

    Ok(n_test)
}

/// Shuffle rows with a seeded RNG and hold out the first `ceil(test_fraction * n)`
///
/// The same `seed` always yields the same partition for the same input
/// ordering.
pub fn train_test_split<L: Clone>(
    features: &FeatureMatrix,
    target: &[L],
    test_fraction: f64,
    seed: u64,
) -> Result<Split<L>> {
    let n_rows = features.nrows();
    if n_rows != target.len() {
        return Err(Error::InconsistentRowCount {
            expected: n_rows,
            found: target.len(),
        });
    }

    let n_test = test_size_for(n_rows, test_fraction)?;

    let mut permutation: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let (test_indices, train_indices) = permutation.split_at(n_test);
    let take = |indices: &[usize]| indices.iter().map(|&i| target[i].clone()).collect::<Vec<L>>();

    Ok(Split {
        train_features: features.select_rows(train_indices)?,
        train_target: take(train_indices),
        test_features: features.select_rows(test_indices)?,
        test_target: take(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn data(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let rows = (0..n).map(|i| vec![i as f64, (i * 2) as f64]).collect();
        let target = (0..n).map(|i| i as f64).collect();
        (FeatureMatrix::from_rows(rows).unwrap(), target)
    }

    #[test]
    fn test_sizes_round_test_up() {
        let (x, y) = data(10);
        let split = train_test_split(&x, &y, 0.3, DEFAULT_SEED).unwrap();
        assert_eq!(split.test_size(), 3);
        assert_eq!(split.train_size(), 7);

        let (x, y) = data(11);
        let split = train_test_split(&x, &y, 0.3, DEFAULT_SEED).unwrap();
        assert_eq!(split.test_size(), 4);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let (x, y) = data(25);
        let split = train_test_split(&x, &y, 0.3, DEFAULT_SEED).unwrap();

        let train: HashSet<_> = split.train_indices.iter().copied().collect();
        let test: HashSet<_> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 25);

        // rows stay aligned with their targets
        for (row, target) in split.train_features.rows().iter().zip(&split.train_target) {
            assert_eq!(row[0], *target);
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let (x, y) = data(40);
        let a = train_test_split(&x, &y, 0.3, 101).unwrap();
        let b = train_test_split(&x, &y, 0.3, 101).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(&x, &y, 0.3, 7).unwrap();
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let (x, y) = data(5);
        assert!(train_test_split(&x, &y[..4], 0.3, 1).is_err());
        assert!(train_test_split(&x, &y, 1.0, 1).is_err());
        let (x, y) = data(1);
        assert!(train_test_split(&x, &y, 0.3, 1).is_err());
    }
}
