//! In-memory tabular dataset
//!
//! A [`Dataset`] is an ordered set of equally long, named [`Column`]s. It is
//! built once by the CSV reader (or by hand in tests) and never mutated by
//! the selection pipeline; partitioning produces new datasets.

mod matrix;

pub use matrix::FeatureMatrix;

use std::collections::HashMap;

use crate::column::Column;
use crate::error::{Error, Result};

/// Immutable-once-loaded table of named columns
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    column_names: Vec<String>,
    column_indices: HashMap<String, usize>,
    row_count: usize,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, column)` pairs, keeping their order
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut dataset = Dataset::new();
        for (name, column) in columns {
            dataset.add_column(name, column)?;
        }
        Ok(dataset)
    }

    /// Append a column; every column must have the same number of rows
    pub fn add_column(&mut self, name: impl Into<String>, mut column: Column) -> Result<()> {
        let name = name.into();

        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }

        if self.columns.is_empty() {
            self.row_count = column.len();
        }

        column.set_name(name.clone());
        self.column_indices.insert(name.clone(), self.columns.len());
        self.column_names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_indices.get(name).map(|&idx| &self.columns[idx])
    }

    /// Iterate `(name, column)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// Names of the columns holding at least one missing value, in column order
    pub fn columns_with_missing(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, column)| column.has_nulls())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Names of the columns stored as text
    pub fn non_numeric_columns(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, column)| !column.is_numeric())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// New dataset without `name`
    pub fn drop_column(&self, name: &str) -> Result<Dataset> {
        if !self.has_column(name) {
            return Err(Error::ColumnNotFound(name.to_string()));
        }

        let mut result = Dataset::new();
        for (col_name, column) in self.iter().filter(|(col_name, _)| *col_name != name) {
            result.add_column(col_name, column.clone())?;
        }
        // a single-column table keeps its row count even with no columns left
        result.row_count = self.row_count;
        Ok(result)
    }

    /// Row-major numeric matrix of every column
    pub fn to_feature_matrix(&self) -> Result<FeatureMatrix> {
        let values = self
            .columns
            .iter()
            .map(Column::to_f64_vec)
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..self.row_count)
            .map(|row_idx| values.iter().map(|col| col[row_idx]).collect())
            .collect();

        FeatureMatrix::new(self.column_names.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int64Column, StringColumn};

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            ("a", Column::from(Int64Column::new(vec![1, 2, 3]))),
            ("b", Column::from(Float64Column::with_nulls(vec![0.5, 0.0, 1.5], vec![false, true, false]))),
            ("c", Column::from(StringColumn::new(vec!["x".into(), "y".into(), "x".into()]))),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_order_and_lookup() {
        let ds = sample();
        assert_eq!(ds.column_names(), &["a", "b", "c"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column("a").and_then(|c| c.name()), Some("a"));
        assert!(ds.column("zzz").is_none());
    }

    #[test]
    fn test_rejects_ragged_and_duplicate_columns() {
        let mut ds = sample();
        let err = ds.add_column("d", Int64Column::new(vec![1]).into());
        assert!(matches!(err, Err(Error::InconsistentRowCount { expected: 3, found: 1 })));

        let err = ds.add_column("a", Int64Column::new(vec![1, 2, 3]).into());
        assert!(matches!(err, Err(Error::DuplicateColumnName(_))));
    }

    #[test]
    fn test_missing_and_text_columns() {
        let ds = sample();
        assert_eq!(ds.columns_with_missing(), vec!["b"]);
        assert_eq!(ds.non_numeric_columns(), vec!["c"]);
    }

    #[test]
    fn test_drop_column_and_matrix() {
        let ds = sample().drop_column("c").unwrap().drop_column("b").unwrap();
        assert_eq!(ds.column_names(), &["a"]);

        let matrix = ds.to_feature_matrix().unwrap();
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.row(2), &[3.0]);
        assert!(sample().drop_column("nope").is_err());
    }
}
