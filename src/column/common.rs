use std::fmt;
use std::sync::Arc;

use crate::column::{BooleanColumn, Float64Column, Int64Column, StringColumn};
use crate::error::{Error, Result};

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Boolean,
    String,
}

impl ColumnType {
    /// Whether values of this type are stored numerically
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnType::String)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Boolean => "bool",
            ColumnType::String => "object",
        };
        write!(f, "{}", name)
    }
}

/// A typed column of a dataset
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    Boolean(BooleanColumn),
    String(StringColumn),
}

/// Null bitmask helpers shared by the concrete column types
pub mod utils {
    use super::*;

    /// Build a bitmask from per-row null flags, `None` when nothing is null
    pub fn create_bitmask(nulls: &[bool]) -> Option<Arc<[u8]>> {
        if !nulls.iter().any(|&is_null| is_null) {
            return None;
        }

        let mut data = vec![0u8; (nulls.len() + 7) / 8];
        for (i, &is_null) in nulls.iter().enumerate() {
            if is_null {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        Some(data.into())
    }

    /// Check a bit in an optional bitmask
    pub fn is_set(mask: &Option<Arc<[u8]>>, index: usize) -> bool {
        match mask {
            None => false,
            Some(bits) => {
                let byte_idx = index / 8;
                byte_idx < bits.len() && (bits[byte_idx] & (1 << (index % 8))) != 0
            }
        }
    }

    /// Count set bits over the first `len` rows
    pub fn count_set(mask: &Option<Arc<[u8]>>, len: usize) -> usize {
        match mask {
            None => 0,
            Some(_) => (0..len).filter(|&i| is_set(mask, i)).count(),
        }
    }
}

impl Column {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(col) => col.len(),
            Column::Float64(col) => col.len(),
            Column::Boolean(col) => col.len(),
            Column::String(col) => col.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Boolean(_) => ColumnType::Boolean,
            Column::String(_) => ColumnType::String,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Column::Int64(col) => col.name.as_deref(),
            Column::Float64(col) => col.name.as_deref(),
            Column::Boolean(col) => col.name.as_deref(),
            Column::String(col) => col.name.as_deref(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = Some(name.into());
        match self {
            Column::Int64(col) => col.name = name,
            Column::Float64(col) => col.name = name,
            Column::Boolean(col) => col.name = name,
            Column::String(col) => col.name = name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type().is_numeric()
    }

    /// Whether the value at `index` is missing
    pub fn is_null(&self, index: usize) -> bool {
        match self {
            Column::Int64(col) => utils::is_set(&col.null_mask, index),
            Column::Float64(col) => utils::is_set(&col.null_mask, index),
            Column::Boolean(col) => utils::is_set(&col.null_mask, index),
            Column::String(col) => utils::is_set(&col.null_mask, index),
        }
    }

    pub fn null_count(&self) -> usize {
        let len = self.len();
        match self {
            Column::Int64(col) => utils::count_set(&col.null_mask, len),
            Column::Float64(col) => utils::count_set(&col.null_mask, len),
            Column::Boolean(col) => utils::count_set(&col.null_mask, len),
            Column::String(col) => utils::count_set(&col.null_mask, len),
        }
    }

    pub fn has_nulls(&self) -> bool {
        self.null_count() > 0
    }

    fn label(&self) -> String {
        self.name().unwrap_or("<unnamed>").to_string()
    }

    /// Numeric view of the column; fails on text storage or missing values
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        if self.has_nulls() {
            return Err(Error::InvalidOperation(format!(
                "Column '{}' contains missing values",
                self.label()
            )));
        }

        match self {
            Column::Int64(col) => Ok(col.data.iter().map(|&v| v as f64).collect()),
            Column::Float64(col) => Ok(col.data.to_vec()),
            Column::Boolean(col) => Ok(col
                .data
                .iter()
                .map(|&v| if v { 1.0 } else { 0.0 })
                .collect()),
            Column::String(_) => Err(Error::InvalidOperation(format!(
                "Column '{}' is not numeric",
                self.label()
            ))),
        }
    }

    /// Class-label view of the column; numbers are rendered in their
    /// shortest form so `1` and `1.0` produce the same label
    pub fn to_label_vec(&self) -> Result<Vec<String>> {
        if self.has_nulls() {
            return Err(Error::InvalidOperation(format!(
                "Column '{}' contains missing values",
                self.label()
            )));
        }

        match self {
            Column::String(col) => Ok(col.data.to_vec()),
            Column::Boolean(col) => Ok(col.data.iter().map(|v| v.to_string()).collect()),
            Column::Int64(col) => Ok(col.data.iter().map(|v| v.to_string()).collect()),
            Column::Float64(col) => Ok(col.data.iter().map(|&v| format_number(v)).collect()),
        }
    }

    /// Whether every numeric value is a whole number
    pub fn is_integral(&self) -> bool {
        match self {
            Column::Int64(_) | Column::Boolean(_) => true,
            Column::Float64(col) => col
                .data
                .iter()
                .enumerate()
                .filter(|(i, _)| !utils::is_set(&col.null_mask, *i))
                .all(|(_, v)| v.is_finite() && v.fract() == 0.0),
            Column::String(_) => false,
        }
    }
}

/// Render a float as a label, dropping a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl From<Int64Column> for Column {
    fn from(col: Int64Column) -> Self {
        Column::Int64(col)
    }
}

impl From<Float64Column> for Column {
    fn from(col: Float64Column) -> Self {
        Column::Float64(col)
    }
}

impl From<BooleanColumn> for Column {
    fn from(col: BooleanColumn) -> Self {
        Column::Boolean(col)
    }
}

impl From<StringColumn> for Column {
    fn from(col: StringColumn) -> Self {
        Column::String(col)
    }
}
