use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Row-major numeric feature table with named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix, checking that every row has one value per column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(Error::DimensionMismatch(format!(
                "row has {} values but the matrix has {} columns",
                bad.len(),
                columns.len()
            )));
        }

        Ok(FeatureMatrix { columns, rows })
    }

    /// Matrix with generated column names `x0`, `x1`, ...
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let columns = (0..width).map(|i| format!("x{}", i)).collect();
        FeatureMatrix::new(columns, rows)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Values of column `index`
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let rows = indices
            .iter()
            .map(|&idx| {
                self.rows.get(idx).cloned().ok_or(Error::IndexOutOfBounds {
                    index: idx,
                    size: self.rows.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureMatrix {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Apply `f(column_index, value)` to every cell
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(usize, f64) -> f64,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().enumerate().map(|(j, &v)| f(j, v)).collect())
            .collect();

        FeatureMatrix {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Fail unless the matrix has exactly `width` columns
    pub fn check_width(&self, width: usize) -> Result<()> {
        if self.ncols() != width {
            return Err(Error::DimensionMismatch(format!(
                "expected {} feature columns, found {}",
                width,
                self.ncols()
            )));
        }
        Ok(())
    }
}
