use std::collections::BTreeSet;
use std::sync::Arc;

use crate::column::common::utils;
use crate::error::{Error, Result};

/// Column of text values
#[derive(Debug, Clone)]
pub struct StringColumn {
    pub(crate) data: Arc<[String]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
    pub(crate) name: Option<String>,
}

impl StringColumn {
    pub fn new(data: Vec<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: None,
        }
    }

    pub fn with_name(data: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
            name: Some(name.into()),
        }
    }

    /// Missing rows keep an empty string in `data`
    pub fn with_nulls(data: Vec<String>, nulls: Vec<bool>) -> Self {
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

    pub fn get(&self, index: usize) -> Result<Option<&str>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if utils::is_set(&self.null_mask, index) {
            Ok(None)
        } else {
            Ok(Some(self.data[index].as_str()))
        }
    }

    /// Distinct non-missing values in sorted order
    pub fn unique(&self) -> Vec<String> {
        self.data
            .iter()
            .enumerate()
            .filter(|(i, _)| !utils::is_set(&self.null_mask, *i))
            .map(|(_, v)| v.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
