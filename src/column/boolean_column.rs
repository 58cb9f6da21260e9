use std::sync::Arc;

use crate::column::common::utils;
use crate::error::{Error, Result};

/// Column of booleans, read from `true`/`false` cells
#[derive(Debug, Clone)]
pub struct BooleanColumn {
    pub(crate) data: Arc<[bool]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl BooleanColumn {
    pub fn new(data: Vec<bool>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    pub fn with_name(data: Vec<bool>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: Some(name.into()),
        }
    }

    pub fn with_nulls(data: Vec<bool>, nulls: Vec<bool>) -> Self {
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

    pub fn get(&self, index: usize) -> Result<Option<bool>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if utils::is_set(&self.null_mask, index) {
            Ok(None)
        } else {
            Ok(Some(self.data[index]))
        }
    }
}
