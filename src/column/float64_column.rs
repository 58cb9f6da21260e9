use std::sync::Arc;

use crate::column::common::utils;
use crate::error::{Error, Result};

/// Column of 64-bit floats
#[derive(Debug, Clone)]
pub struct Float64Column {
    pub(crate) data: Arc<[f64]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl Float64Column {
    /// Create a column without a name
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    /// Create a named column
    pub fn with_name(data: Vec<f64>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: Some(name.into()),
        }
    }

    /// Create a column where `nulls[i]` marks row `i` as missing
    pub fn with_nulls(data: Vec<f64>, nulls: Vec<bool>) -> Self {
        Self {
            data: data.into(),
            null_mask: utils::create_bitmask(&nulls),
            name: None,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `index`, `None` when missing
    pub fn get(&self, index: usize) -> Result<Option<f64>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if utils::is_set(&self.null_mask, index) {
            return Ok(None);
        }

        Ok(Some(self.data[index]))
    }

    /// Mean of the non-missing values
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| !utils::is_set(&self.null_mask, *i))
            .fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}
